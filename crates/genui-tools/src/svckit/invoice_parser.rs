//! Invoice Parser Tool
//!
//! The model extracts the invoice fields itself (typically from an uploaded
//! image); this tool checks them against the invoice schema and returns the
//! normalized invoice for rendering.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use genui_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolOutput, ToolSchema,
};

use crate::error::{Result, ToolError};
use crate::model::Invoice;

pub const INVOICE_PARSER: &str = "invoice-parser";

/// Normalized invoice with its computed total
#[derive(Serialize)]
struct ParsedInvoice<'a> {
    #[serde(flatten)]
    invoice: &'a Invoice,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

/// Tool for normalizing an extracted invoice
#[derive(Clone, Copy, Debug, Default)]
pub struct InvoiceParserTool;

impl InvoiceParserTool {
    pub const fn new() -> Self {
        Self
    }

    fn parse(call: &ToolCall) -> Result<Invoice> {
        let mut invoice: Invoice = serde_json::from_value(Value::Object(call.arguments.clone()))
            .map_err(|e| ToolError::InvalidInvoice(e.to_string()))?;

        if invoice.line_items.is_empty() {
            return Err(ToolError::InvalidInvoice("invoice has no line items".into()));
        }

        for item in &mut invoice.line_items {
            if item.quantity == 0 {
                return Err(ToolError::InvalidInvoice(format!(
                    "quantity of '{}' must be greater than 0",
                    item.name
                )));
            }
            if item.price <= Decimal::ZERO {
                return Err(ToolError::InvalidInvoice(format!(
                    "price of '{}' must be greater than 0",
                    item.name
                )));
            }
            if item.id.as_deref().is_none_or(str::is_empty) {
                item.id = Some(Uuid::new_v4().to_string());
            }
        }

        Ok(invoice)
    }
}

#[async_trait]
impl Tool for InvoiceParserTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: INVOICE_PARSER.into(),
            description: "Validate an invoice, fill in missing line item IDs and return it with its total.".into(),
            parameters: vec![
                ParameterSchema::required("orderId", "string", "The order ID"),
                ParameterSchema::required("lineItems", "array", "The line items of the invoice")
                    .with_schema(json!({
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string", "description": "Unique identifier for the line item"},
                                "name": {"type": "string", "description": "Name or description of the line item"},
                                "quantity": {"type": "integer", "minimum": 1, "description": "Quantity of the line item"},
                                "price": {"type": "number", "exclusiveMinimum": 0, "description": "Price per unit of the line item"}
                            },
                            "required": ["name", "quantity", "price"]
                        }
                    })),
                ParameterSchema::optional("shippingAddress", "object", "The shipping address")
                    .with_schema(json!({
                        "properties": {
                            "name": {"type": "string"},
                            "street": {"type": "string"},
                            "city": {"type": "string"},
                            "state": {"type": "string"},
                            "zip": {"type": "string"}
                        },
                        "required": ["name", "street", "city", "state", "zip"]
                    })),
                ParameterSchema::optional("customerInfo", "object", "The customer's information")
                    .with_schema(json!({
                        "properties": {
                            "name": {"type": "string"},
                            "email": {"type": "string"},
                            "phone": {"type": "string"}
                        },
                        "required": ["name", "email"]
                    })),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolOutput> {
        match Self::parse(call) {
            Ok(invoice) => {
                let parsed = ParsedInvoice {
                    total: invoice.total(),
                    invoice: &invoice,
                };
                Ok(ToolOutput::Data(serde_json::to_value(parsed)?))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invoice rejected");
                Ok(ToolOutput::message(e.to_string()))
            }
        }
    }
}
