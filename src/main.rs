use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use nf_dashboard::domain::entities::dataset::FilterSelection;
use nf_dashboard::domain::entities::invoice::{Status, YearMonth};
use nf_dashboard::domain::entities::layout::{
    SheetLayout, DEFAULT_FIRST_COLUMN, DEFAULT_SHEET_NAME, DEFAULT_SKIP_ROWS,
};
use nf_dashboard::infra::export::csv::{
    write_aggregates_csv, write_consolidated_csv, write_summary_csv,
};
use nf_dashboard::infra::import::xlsx::CalamineSheetReader;
use nf_dashboard::ui::state::dashboard_state::{DashboardState, DashboardStatus, DashboardView};
use nf_dashboard::usecase::services::import_service::ImportService;

#[derive(Parser, Debug)]
#[command(
    name = "nf-dashboard",
    version,
    about = "Consolidate a nota fiscal workbook and report billing figures"
)]
struct Cli {
    /// Workbook to load (xlsx, xlsm, xlsb, xls or ods)
    file: PathBuf,

    #[arg(long, env = "NF_SHEET_NAME", default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Title rows above the header row
    #[arg(long, env = "NF_SKIP_ROWS", default_value_t = DEFAULT_SKIP_ROWS)]
    skip_rows: usize,

    /// Column letter of the invoice number; 8 columns are read from here
    #[arg(long, env = "NF_FIRST_COLUMN", default_value = DEFAULT_FIRST_COLUMN)]
    first_column: String,

    #[arg(long = "payer")]
    payers: Vec<String>,

    /// Pago or Pendente
    #[arg(long = "status")]
    statuses: Vec<Status>,

    /// YYYY-MM
    #[arg(long = "month")]
    months: Vec<YearMonth>,

    /// Case-insensitive text searched in every column
    #[arg(long)]
    search: Option<String>,

    /// Write the tables and breakdowns as CSV files into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = SheetLayout {
        sheet_name: cli.sheet_name,
        skip_rows: cli.skip_rows,
        first_column: cli.first_column,
    };

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read workbook: {}", cli.file.display()))?;
    let import = ImportService::new(Arc::new(CalamineSheetReader), layout);
    let mut state = DashboardState::new(import);

    let status = state
        .upload(&bytes)
        .with_context(|| format!("failed to load workbook: {}", cli.file.display()))?;
    if status == DashboardStatus::NoData {
        println!("Nenhuma nota fiscal com invoice encontrada na planilha.");
        return Ok(());
    }

    state.set_filters(FilterSelection {
        payers: cli.payers.into_iter().collect(),
        statuses: cli.statuses.into_iter().collect(),
        months: cli.months.into_iter().collect::<BTreeSet<_>>(),
    });
    if let Some(term) = cli.search {
        state.set_search(term);
    }

    let view = state.view();
    print_report(&view, state.search_term());

    if let Some(dir) = cli.export_dir {
        export(&dir, &view)?;
        info!(dir = %dir.display(), "exported dashboard tables");
    }
    Ok(())
}

fn format_brl(value: f64) -> String {
    let text = format!("{:.2}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::new();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("R$ {sign}{grouped}.{frac_part}")
}

fn print_report(view: &DashboardView, search_term: &str) {
    let agg = &view.aggregates;
    println!("Total de Notas: {}", agg.invoice_count);
    println!("Valor Bruto Total: {}", format_brl(agg.gross_total));
    println!("Valor Líquido Total: {}", format_brl(agg.net_total));
    if !view.skipped_rows.is_empty() {
        println!(
            "Linhas ignoradas (sem número de nota ou data de emissão inválida): {}",
            view.skipped_rows.len()
        );
    }

    println!();
    println!("Status de Pagamento");
    for status in Status::ALL {
        println!("  {status}: {}", agg.status_counts.get(status));
    }

    println!();
    println!("Faturamento Mensal");
    for month in &agg.monthly {
        println!(
            "  {}: bruto {} / líquido {}",
            month.month,
            format_brl(month.gross),
            format_brl(month.net)
        );
    }

    println!();
    println!("Top 10 Clientes por Valor Bruto");
    for (rank, payer) in agg.top_payers.iter().enumerate() {
        println!("  {:>2}. {} {}", rank + 1, payer.payer, format_brl(payer.gross));
    }

    println!();
    println!("Distribuição de Notas por Cliente");
    for payer in &agg.invoices_by_payer {
        println!("  {}: {}", payer.payer, payer.invoices);
    }

    println!();
    println!(
        "Notas Fiscais (filtradas): {} de {}",
        view.filtered.len(),
        view.summary.len()
    );
    for row in &view.filtered.rows {
        println!(
            "  {} | {} | {} | {} | {}",
            row.invoice_number,
            row.issue_date.format("%Y-%m-%d"),
            row.payer,
            format_brl(row.gross_amount),
            row.status
        );
    }

    if let Some(results) = &view.search_results {
        println!();
        println!("Resultados encontrados para: {search_term} ({})", results.len());
        for row in &results.rows {
            let cells: Vec<String> = row.cells().iter().map(|cell| cell.display()).collect();
            println!("  {}", cells.join(" | "));
        }
    }
}

fn export(dir: &Path, view: &DashboardView) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;

    let consolidated_path = dir.join("consolidated.csv");
    let file = File::create(&consolidated_path)
        .with_context(|| format!("failed to create csv: {}", consolidated_path.display()))?;
    write_consolidated_csv(file, &view.consolidated)?;

    let summary_path = dir.join("summary.csv");
    let file = File::create(&summary_path)
        .with_context(|| format!("failed to create csv: {}", summary_path.display()))?;
    write_summary_csv(file, &view.summary)?;

    let filtered_path = dir.join("summary_filtered.csv");
    let file = File::create(&filtered_path)
        .with_context(|| format!("failed to create csv: {}", filtered_path.display()))?;
    write_summary_csv(file, &view.filtered)?;

    if let Some(results) = &view.search_results {
        let search_path = dir.join("search.csv");
        let file = File::create(&search_path)
            .with_context(|| format!("failed to create csv: {}", search_path.display()))?;
        write_consolidated_csv(file, results)?;
    }

    write_aggregates_csv(dir, &view.aggregates)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(1234567.891), "R$ 1,234,567.89");
        assert_eq!(format_brl(0.0), "R$ 0.00");
        assert_eq!(format_brl(-950.5), "R$ -950.50");
    }

    #[test]
    fn cli_parses_repeated_filters() {
        let cli = Cli::try_parse_from([
            "nf-dashboard",
            "notas.xlsx",
            "--payer",
            "Acme",
            "--payer",
            "Beta",
            "--status",
            "Pago",
            "--month",
            "2024-02",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.payers, vec!["Acme", "Beta"]);
        assert_eq!(cli.statuses, vec![Status::Paid]);
        assert_eq!(cli.months[0].to_string(), "2024-02");
        assert_eq!(cli.skip_rows, DEFAULT_SKIP_ROWS);
    }
}
