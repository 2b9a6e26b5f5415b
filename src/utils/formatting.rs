use chrono::{DateTime, Local, Utc};
use console::style;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::models::{
    bill::Bill,
    cart::{Cart, CartLine},
    menu::MenuItem,
    order::Order,
};

const RECEIPT_WIDTH: usize = 44;

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct MenuTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Veg")]
    vegetarian: String,
    #[tabled(rename = "Price")]
    price: String,
}

pub fn format_currency(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

fn line_rows(lines: &[CartLine]) -> Vec<CartTableRow> {
    lines
        .iter()
        .map(|line| CartTableRow {
            id: line.id.clone(),
            name: truncate(&line.name, 28),
            price: format_currency(line.unit_price),
            quantity: line.quantity,
            amount: format_currency(line.line_total()),
        })
        .collect()
}

pub fn format_cart_table(cart: &Cart) -> String {
    if cart.is_empty() {
        return String::new();
    }

    let mut table = Table::new(line_rows(cart.lines()));
    table
        .with(Style::rounded())
        .with(Alignment::left())
        .modify(Columns::new(2..), Alignment::right());

    format!(
        "{}\n{}: {}   {}: {}",
        table,
        style("Items").bold(),
        cart.line_count(),
        style("Total").bold(),
        style(format_currency(cart.total())).green()
    )
}

pub fn format_menu_table(items: &[&MenuItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let rows: Vec<MenuTableRow> = items
        .iter()
        .map(|item| MenuTableRow {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.to_string(),
            vegetarian: (if item.vegetarian { "yes" } else { "no" }).to_string(),
            price: format_currency(item.price),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());
    table.to_string()
}

pub fn format_order_summary(order: &Order) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}: {}\n", style("Order").bold(), style(order.id).cyan()));
    output.push_str(&format!("{}: {}\n", style("Type").bold(), order.order_type));
    if let Some(table) = order.table_number {
        output.push_str(&format!("{}: {}\n", style("Table").bold(), table));
    }
    output.push_str(&format!(
        "{}: {} item(s), {}\n",
        style("Items").bold(),
        order.item_count(),
        format_currency(order.total)
    ));
    output.push_str(&format!("{}: {}\n", style("Status").bold(), style(order.status).yellow()));
    output.push_str(&format!(
        "{}: ~{} min\n",
        style("Ready in").bold(),
        order.estimated_prep_time
    ));
    if let Some(notes) = &order.special_instructions {
        output.push_str(&format!("{}: {}\n", style("Notes").bold(), style(notes).dim()));
    }
    output
}

/// Plain-text receipt, suitable for printing.
pub fn render_receipt(bill: &Bill) -> String {
    let rule = "-".repeat(RECEIPT_WIDTH);
    let mut out = Vec::new();

    out.push(center(&bill.restaurant.name));
    out.push(center(&bill.restaurant.address));
    out.push(center(&format!("Tel: {}", bill.restaurant.phone)));
    if let Some(gstin) = &bill.restaurant.gstin {
        out.push(center(&format!("GSTIN: {}", gstin)));
    }
    out.push(rule.clone());
    out.push(format!("Bill No: {}", bill.bill_number));
    out.push(format!("Date:    {}", format_date(&bill.created_at)));
    match bill.table_number {
        Some(table) => out.push(format!("Type:    {} (table {})", bill.order_type, table)),
        None => out.push(format!("Type:    {}", bill.order_type)),
    }
    out.push(format!("Name:    {}", bill.customer.name));
    out.push(format!("Phone:   {}", bill.customer.phone));
    if let Some(email) = &bill.customer.email {
        out.push(format!("Email:   {}", email));
    }
    out.push(rule.clone());

    for line in &bill.lines {
        let label = format!("{} x{}", truncate(&line.name, 26), line.quantity);
        out.push(two_columns(&label, &format_currency(line.line_total())));
    }

    out.push(rule.clone());
    out.push(two_columns("Subtotal", &format_currency(bill.subtotal)));
    out.push(two_columns("Tax", &format_currency(bill.tax)));
    if bill.service_charge > 0.0 {
        out.push(two_columns("Service charge", &format_currency(bill.service_charge)));
    }
    if bill.discount > 0.0 {
        out.push(two_columns("Discount", &format!("-{}", format_currency(bill.discount))));
    }
    out.push(rule.clone());
    out.push(two_columns("TOTAL", &format_currency(bill.total)));
    out.push(two_columns("Paid by", &bill.payment_method.to_string()));
    out.push(rule);
    out.push(center("Thank you for dining with us!"));

    out.join("\n")
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn two_columns(left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = RECEIPT_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

fn center(text: &str) -> String {
    let len = text.chars().count();
    let pad = RECEIPT_WIDTH.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
