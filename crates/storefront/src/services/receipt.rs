//! Receipt rendering.

use askama::Template;
use thiserror::Error;

use bookshop_core::{Price, Transaction, TransactionId, pricing};

use crate::config::ReceiptConfig;

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered receipt, ready to attach to a mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Turns a completed transaction into a receipt document.
pub trait ReceiptRenderer: Send + Sync {
    /// Render the receipt for `transaction`, addressed to `customer_name`.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError` if the document cannot be produced.
    fn render(
        &self,
        transaction: &Transaction,
        customer_name: &str,
    ) -> Result<ReceiptDocument, ReceiptError>;
}

struct ReceiptLine {
    item: String,
    price: String,
    quantity: u32,
    total: String,
}

#[derive(Template)]
#[template(path = "receipt.txt")]
struct TextReceipt<'a> {
    tax_id: &'a str,
    shop_name: &'a str,
    transaction_id: TransactionId,
    date: String,
    time: String,
    customer: &'a str,
    lines: Vec<ReceiptLine>,
    grand_total: String,
}

/// Fixed-layout plain-text receipt.
#[derive(Debug, Clone)]
pub struct TextReceiptRenderer {
    config: ReceiptConfig,
}

impl TextReceiptRenderer {
    #[must_use]
    pub const fn new(config: ReceiptConfig) -> Self {
        Self { config }
    }
}

impl ReceiptRenderer for TextReceiptRenderer {
    fn render(
        &self,
        transaction: &Transaction,
        customer_name: &str,
    ) -> Result<ReceiptDocument, ReceiptError> {
        let lines = transaction
            .items
            .iter()
            .map(|item| ReceiptLine {
                item: item.product_id.clone(),
                price: Price::usd(item.unit_price).display(),
                quantity: item.quantity,
                total: Price::usd(pricing::line_total(item)).display(),
            })
            .collect();

        let text = TextReceipt {
            tax_id: &self.config.tax_id,
            shop_name: &self.config.shop_name,
            transaction_id: transaction.id,
            date: transaction.created_at.format("%Y-%m-%d").to_string(),
            time: transaction.created_at.format("%H:%M:%S").to_string(),
            customer: customer_name,
            lines,
            grand_total: Price::usd(transaction.total_amount).display(),
        }
        .render()?;

        Ok(ReceiptDocument {
            filename: "receipt.txt".to_owned(),
            content_type: "text/plain; charset=utf-8".to_owned(),
            bytes: text.into_bytes(),
        })
    }
}
