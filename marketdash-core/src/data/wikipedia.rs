//! Reference tables scraped from Wikipedia pages.
//!
//! Every `<table>` on the page becomes a `RawTable`: the first row made only
//! of `<th>` cells is the header, later rows holding at least one `<td>` are
//! data. `colspan` repeats a cell across columns and `rowspan` carries it
//! down into the following rows; rows of a nested table belong to that table
//! only. Data rows whose width still differs from the header are dropped.
//! Footnote markers (`[1]`, `[a]`) and repeated whitespace are stripped from
//! cell text.

use super::http::HttpFetcher;
use super::provider::{RawTable, TableSource};
use crate::config::HttpConfig;
use crate::error::SourceError;
use scraper::{ElementRef, Html, Selector};

const MAX_SPAN: usize = 64;

pub struct WikipediaTables {
    http: HttpFetcher,
}

impl WikipediaTables {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
        })
    }
}

impl TableSource for WikipediaTables {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn fetch_tables(&self, url: &str) -> Result<Vec<RawTable>, SourceError> {
        let html = self.http.get_text(url)?;
        let tables = parse_tables(&html)?;
        tracing::debug!(url, tables = tables.len(), "parsed reference page");
        Ok(tables)
    }
}

/// Parse every table in an HTML document.
pub fn parse_tables(html: &str) -> Result<Vec<RawTable>, SourceError> {
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let doc = Html::parse_document(html);

    let tables = doc
        .select(&table_sel)
        .map(|table| {
            let mut headers: Option<Vec<String>> = None;
            let mut rows = Vec::new();
            let mut carry = Vec::new();

            let own_rows = table.select(&row_sel).filter(|tr| {
                tr.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|a| a.value().name() == "table")
                    .map(|a| a.id())
                    == Some(table.id())
            });

            for tr in own_rows {
                let cells: Vec<ElementRef> = tr
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| matches!(c.value().name(), "th" | "td"))
                    .collect();
                if cells.is_empty() {
                    continue;
                }

                let all_th = cells.iter().all(|c| c.value().name() == "th");
                let row = expand_row(&cells, &mut carry);
                if let Some(h) = &headers {
                    if !all_th && row.len() == h.len() {
                        rows.push(row);
                    }
                } else if all_th {
                    headers = Some(row);
                }
            }

            RawTable {
                headers: headers.unwrap_or_default(),
                rows,
            }
        })
        .filter(|t| !t.headers.is_empty())
        .collect();

    Ok(tables)
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Other(format!("bad selector {css}: {e}")))
}

/// A cell repeated into the rows below it by `rowspan`.
struct Carry {
    text: String,
    rows_left: usize,
}

/// Lay a row's cells out on the column grid, filling columns still covered
/// by a `rowspan` from an earlier row.
fn expand_row(cells: &[ElementRef], carry: &mut Vec<Option<Carry>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut cells = cells.iter();

    loop {
        let col = out.len();
        if let Some(Some(c)) = carry.get_mut(col) {
            out.push(c.text.clone());
            c.rows_left -= 1;
            if c.rows_left == 0 {
                carry[col] = None;
            }
            continue;
        }

        let Some(cell) = cells.next() else {
            break;
        };
        let text = cell_text(cell);
        let colspan = span(cell, "colspan");
        let rowspan = span(cell, "rowspan");
        for _ in 0..colspan {
            let col = out.len();
            if rowspan > 1 {
                if carry.len() <= col {
                    carry.resize_with(col + 1, || None);
                }
                carry[col] = Some(Carry {
                    text: text.clone(),
                    rows_left: rowspan - 1,
                });
            }
            out.push(text.clone());
        }
    }

    out
}

fn span(cell: &ElementRef, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn cell_text(cell: &ElementRef) -> String {
    let raw: String = cell.text().collect();
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
