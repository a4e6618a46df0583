//! Partial results.
//!
//! A dashboard section is always rendered: when a source fails, the section
//! gets whatever data survived plus the errors that explain what is missing.

use crate::error::DashError;

#[derive(Debug)]
pub struct Report<T> {
    pub data: T,
    pub warnings: Vec<DashError>,
}

impl<T> Report<T> {
    pub fn clean(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn warn(&mut self, warning: DashError) {
        tracing::warn!(%warning, "degraded section");
        self.warnings.push(warning);
    }

    /// Move `other`'s warnings into this report and hand back its data.
    pub fn absorb<U>(&mut self, other: Report<U>) -> U {
        self.warnings.extend(other.warnings);
        other.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Report<U> {
        Report {
            data: f(self.data),
            warnings: self.warnings,
        }
    }
}

impl<T: Default> Report<T> {
    /// Keep the value on success; on failure, default data and one warning.
    pub fn from_result(result: Result<T, DashError>) -> Self {
        match result {
            Ok(data) => Self::clean(data),
            Err(e) => {
                let mut report = Self::clean(T::default());
                report.warn(e);
                report
            }
        }
    }
}
