use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated trade record shown on the transaction history page.
///
/// All records are sample data; the platform trades virtual funds only and
/// has no order book behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u32,
    pub date: String,
    pub stock: String,
    pub action: TradeAction,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn is_buy(&self) -> bool {
        matches!(self, TradeAction::Buy)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

impl Transaction {
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Simulated holding shown on the investments page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub date: String,
    pub stock: String,
    pub quantity: u32,
    pub buy_price: f64,
    pub current_price: f64,
    pub pl: f64,
}

fn tx(id: u32, date: &str, stock: &str, action: TradeAction, quantity: u32, price: f64) -> Transaction {
    Transaction {
        id,
        date: date.to_string(),
        stock: stock.to_string(),
        action,
        quantity,
        price,
    }
}

pub fn sample_transactions() -> Vec<Transaction> {
    vec![
        tx(1, "2025-08-12", "TCS", TradeAction::Buy, 10, 3500.00),
        tx(2, "2025-08-11", "RELIANCE", TradeAction::Sell, 5, 2900.50),
        tx(3, "2025-08-10", "INFY", TradeAction::Buy, 15, 1550.75),
        tx(4, "2025-08-09", "TCS", TradeAction::Buy, 5, 3450.00),
        tx(5, "2025-08-08", "WIPRO", TradeAction::Buy, 20, 400.25),
    ]
}

pub fn sample_investments() -> Vec<Investment> {
    vec![
        Investment {
            date: "2025-08-12".into(),
            stock: "TCS".into(),
            quantity: 10,
            buy_price: 3500.00,
            current_price: 3600.00,
            pl: 1000.00,
        },
        Investment {
            date: "2025-08-11".into(),
            stock: "RELIANCE".into(),
            quantity: 5,
            buy_price: 2800.50,
            current_price: 2900.50,
            pl: 500.00,
        },
        Investment {
            date: "2025-08-10".into(),
            stock: "INFY".into(),
            quantity: 15,
            buy_price: 1500.75,
            current_price: 1550.75,
            pl: 750.00,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFilter {
    #[default]
    All,
    Buy,
    Sell,
}

impl ActionFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("buy") => ActionFilter::Buy,
            Some("sell") => ActionFilter::Sell,
            _ => ActionFilter::All,
        }
    }

    fn matches(self, action: TradeAction) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Buy => action == TradeAction::Buy,
            ActionFilter::Sell => action == TradeAction::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Price,
}

impl SortKey {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price") => SortKey::Price,
            _ => SortKey::Date,
        }
    }
}

/// Filter by action and stock-symbol substring, then sort descending by the
/// chosen key. The sort is stable, so equal keys keep their original
/// relative order.
pub fn filter_transactions(
    rows: &[Transaction],
    filter: ActionFilter,
    search: &str,
    sort: SortKey,
) -> Vec<Transaction> {
    let needle = search.to_lowercase();
    let mut out: Vec<Transaction> = rows
        .iter()
        .filter(|t| filter.matches(t.action))
        .filter(|t| t.stock.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    match sort {
        SortKey::Date => out.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date))),
        SortKey::Price => out.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    out
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Render the rows as the downloadable CSV: a fixed header line, then one
/// line per row in Date,Stock,Action,Quantity,Price column order.
pub fn to_csv(rows: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push("Date,Stock,Action,Quantity,Price".to_string());
    for t in rows {
        lines.push(format!(
            "{},{},{},{},{:.2}",
            t.date, t.stock, t.action, t.quantity, t.price
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_filter_keeps_buy_rows_in_original_order() {
        let rows = filter_transactions(
            &sample_transactions(),
            ActionFilter::Buy,
            "",
            SortKey::Date,
        );
        let stocks: Vec<&str> = rows.iter().map(|t| t.stock.as_str()).collect();
        assert_eq!(stocks, ["TCS", "INFY", "TCS", "WIPRO"]);
        assert!(rows.iter().all(|t| t.action == TradeAction::Buy));
    }

    #[test]
    fn search_matches_symbol_substring_case_insensitively() {
        let rows = filter_transactions(
            &sample_transactions(),
            ActionFilter::All,
            "tc",
            SortKey::Date,
        );
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|t| t.stock == "TCS"));
    }

    #[test]
    fn price_sort_is_descending() {
        let rows = filter_transactions(
            &sample_transactions(),
            ActionFilter::All,
            "",
            SortKey::Price,
        );
        let prices: Vec<f64> = rows.iter().map(|t| t.price).collect();
        assert_eq!(prices, [3500.00, 3450.00, 2900.50, 1550.75, 400.25]);
    }

    #[test]
    fn csv_has_header_plus_one_line_per_row() {
        let rows = filter_transactions(
            &sample_transactions(),
            ActionFilter::Buy,
            "",
            SortKey::Date,
        );
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(lines[0], "Date,Stock,Action,Quantity,Price");
        assert_eq!(lines[1], "2025-08-12,TCS,BUY,10,3500.00");
        assert_eq!(lines[2], "2025-08-10,INFY,BUY,15,1550.75");
        assert_eq!(lines[3], "2025-08-09,TCS,BUY,5,3450.00");
        assert_eq!(lines[4], "2025-08-08,WIPRO,BUY,20,400.25");
    }

    #[test]
    fn empty_filter_result_is_header_only() {
        let csv = to_csv(&[]);
        assert_eq!(csv, "Date,Stock,Action,Quantity,Price");
    }

    #[test]
    fn totals_are_quantity_times_price() {
        let t = &sample_transactions()[0];
        assert!((t.total() - 35000.0).abs() < f64::EPSILON);
    }
}
