use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let columns = headers.len();
    let mut widths = vec![0usize; columns];
    for (i, h) in headers.iter().enumerate() {
        widths[i] = h.len();
    }
    for row in &rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .take(columns)
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", render(&header));
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", dashes.join("  "));
    for row in &rows {
        println!("{}", render(row));
    }
}
