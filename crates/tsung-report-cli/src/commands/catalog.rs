use crate::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use tsung_report_core::analysis::{ChartKind, TableKind};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
}

/// Table and chart ids accepted by `report --tables/--charts`
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub tables: Vec<CatalogEntry>,
    pub charts: Vec<CatalogEntry>,
}

pub fn catalog() -> Catalog {
    Catalog {
        tables: TableKind::ALL
            .iter()
            .map(|kind| CatalogEntry {
                id: kind.as_str(),
                title: kind.title(),
            })
            .collect(),
        charts: ChartKind::ALL
            .iter()
            .map(|kind| CatalogEntry {
                id: kind.as_str(),
                title: kind.spec().title,
            })
            .collect(),
    }
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let catalog = catalog();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Table => {
            println!("Kind,Id,Title");
            for entry in &catalog.tables {
                println!("table,{},{}", entry.id, entry.title);
            }
            for entry in &catalog.charts {
                println!("chart,{},{}", entry.id, entry.title);
            }
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style("Tables").bold());
            for entry in &catalog.tables {
                println!("  {:<22} {}", style(entry.id).cyan(), entry.title);
            }
            println!("\n{}", style("Charts").bold());
            for entry in &catalog.charts {
                println!("  {:<22} {}", style(entry.id).cyan(), entry.title);
            }
            println!();
        }
    }

    Ok(())
}
