use folio_core::domain::stock::StockRecord;
use std::io::Write;

pub fn write_table(out: &mut impl Write, stocks: &[StockRecord]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<8} {:<24} {:>12} {:>8}  {}",
        "TICKER", "NAME", "PRICE", "QTY", "PRICED AT"
    )?;

    for stock in stocks {
        let (units, cents) = stock.price_units();
        let sign = if stock.is_negative_price() { "-" } else { "" };
        let price = format!("{sign}{units}.{cents:02} {}", stock.currency);
        let quantity = stock
            .quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".to_string());
        let priced_at = stock
            .price_timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "{:<8} {:<24} {:>12} {:>8}  {}",
            stock.ticker, stock.name, price, quantity, priced_at
        )?;
    }

    Ok(())
}

pub fn write_json(out: &mut impl Write, stocks: &[StockRecord]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, stocks)?;
    writeln!(out)?;
    Ok(())
}
