//! Dashboard, investments and transaction-history pages. All figures are
//! sample data; filtering, sorting and the CSV export run over the
//! in-memory rows.

use askama::Template;
use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::models::portfolio::{
    filter_transactions, sample_investments, sample_transactions, to_csv, ActionFilter,
    Investment, SortKey, TradeAction, Transaction,
};
use crate::models::user::AuthUser;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub name: String,
}

#[derive(Template)]
#[template(path = "investments.html")]
pub struct InvestmentsTemplate {
    pub rows: Vec<Investment>,
    pub invested_total: f64,
    pub current_total: f64,
    pub pl_total: f64,
}

#[derive(Template)]
#[template(path = "transactions.html")]
pub struct TransactionsTemplate {
    pub rows: Vec<Transaction>,
    pub action: String,
    pub search: String,
    pub sort: String,
    pub buy_total: f64,
    pub sell_total: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

pub async fn home_page(user: AuthUser) -> impl IntoResponse {
    HomeTemplate {
        name: user.profile_snapshot().display_name(),
    }
}

pub async fn investments_page(_user: AuthUser) -> impl IntoResponse {
    let rows = sample_investments();
    let invested_total = rows
        .iter()
        .map(|i| i.buy_price * i.quantity as f64)
        .sum();
    let current_total = rows
        .iter()
        .map(|i| i.current_price * i.quantity as f64)
        .sum();
    let pl_total = rows.iter().map(|i| i.pl).sum();

    InvestmentsTemplate {
        rows,
        invested_total,
        current_total,
        pl_total,
    }
}

pub async fn transactions_page(
    _user: AuthUser,
    Query(params): Query<TransactionQuery>,
) -> impl IntoResponse {
    let rows = filtered_rows(&params);

    // Totals are plain arithmetic over the currently filtered rows.
    let buy_total = rows
        .iter()
        .filter(|t| t.action == TradeAction::Buy)
        .map(Transaction::total)
        .sum();
    let sell_total = rows
        .iter()
        .filter(|t| t.action == TradeAction::Sell)
        .map(Transaction::total)
        .sum();

    TransactionsTemplate {
        rows,
        action: params.action.unwrap_or_else(|| "all".to_string()),
        search: params.search.unwrap_or_default(),
        sort: params.sort.unwrap_or_else(|| "date".to_string()),
        buy_total,
        sell_total,
    }
}

/// Download the currently filtered rows as `transactions.csv`.
pub async fn export_transactions(
    _user: AuthUser,
    Query(params): Query<TransactionQuery>,
) -> Response {
    let csv = to_csv(&filtered_rows(&params));

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

fn filtered_rows(params: &TransactionQuery) -> Vec<Transaction> {
    filter_transactions(
        &sample_transactions(),
        ActionFilter::parse(params.action.as_deref()),
        params.search.as_deref().unwrap_or(""),
        SortKey::parse(params.sort.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthUser {
        AuthUser {
            user_id: "u-1".into(),
            email: "trader@example.com".into(),
            full_name: None,
            avatar_url: None,
            access_token: "token".into(),
        }
    }

    #[tokio::test]
    async fn export_is_a_csv_attachment() {
        let response = export_transactions(
            test_user(),
            Query(TransactionQuery {
                action: Some("buy".into()),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"transactions.csv\""
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // Header plus the four BUY rows from the sample dataset.
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Date,Stock,Action,Quantity,Price");
        assert!(lines[1..].iter().all(|l| l.contains(",BUY,")));
    }
}
