use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::Url;

use crate::domain::errors::NotificationError;
use crate::domain::order::{Order, PaymentMethod};
use crate::domain::ports::OrderNotifier;

const WHATSAPP_BASE: &str = "https://wa.me";

/// Turns an order into a WhatsApp deep link addressed to the canteen admin.
/// Opening the link is left to whoever renders it; the notifier only logs it.
#[derive(Debug, Clone)]
pub struct WhatsAppNotifier {
    admin_phone: String,
}

impl WhatsAppNotifier {
    /// `admin_phone` is the international number without `+`, e.g. `62812...`.
    pub fn new(admin_phone: impl Into<String>) -> Self {
        Self {
            admin_phone: admin_phone.into(),
        }
    }

    pub fn deep_link(&self, order: &Order) -> Result<Url, NotificationError> {
        let phone = self.admin_phone.trim();
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(NotificationError::NotConfigured(format!(
                "invalid admin phone '{}'",
                self.admin_phone
            )));
        }

        let base = format!("{}/{}", WHATSAPP_BASE, phone);
        Url::parse_with_params(&base, &[("text", format_message(order))])
            .map_err(|e| NotificationError::Format(e.to_string()))
    }
}

#[async_trait]
impl OrderNotifier for WhatsAppNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotificationError> {
        let link = self.deep_link(order)?;
        log::info!("order {} ready to send: {}", order.id, link);
        Ok(())
    }
}

pub fn format_message(order: &Order) -> String {
    let items = order
        .items
        .iter()
        .map(|line| {
            format!(
                "- {} (x{}) = Rp {}",
                line.name,
                line.quantity,
                rupiah(&line.extended_price())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let payment = match order.payment_method {
        PaymentMethod::Cash => format!(
            "*PAYMENT: CASH*\n- Cash: Rp {}\n- Change: Rp {}",
            order.cash_amount.as_ref().map(rupiah).unwrap_or_default(),
            order.change.as_ref().map(rupiah).unwrap_or_default(),
        ),
        PaymentMethod::Transfer => format!(
            "*PAYMENT: BANK TRANSFER*\n- Amount: Rp {}\n_Awaiting transfer confirmation_",
            rupiah(&order.total)
        ),
    };

    format!(
        "*NEW CANTEEN ORDER*\n\n\
         *CUSTOMER:*\n- Name: {}\n- Location: {}\n- Time: {}\n- Order ID: #{}\n\n\
         *ITEMS:*\n{}\n\n\
         *TOTAL: Rp {}*\n\n\
         {}\n\n\
         Notes: {}\n\n\
         Status: {}",
        order.customer_name,
        order.customer_location,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.id,
        items,
        rupiah(&order.total),
        payment,
        order.notes.as_deref().unwrap_or("-"),
        order.status.as_str().to_uppercase(),
    )
}

/// Whole rupiah with `.` thousands separators, e.g. `15000` → `15.000`.
fn rupiah(amount: &BigDecimal) -> String {
    let digits = amount.round(0).with_scale(0).to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}
