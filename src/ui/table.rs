use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use crate::reporters::writer::SummaryStats;

pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        Self { table }
    }

    /// Per-artifact line counts from the run summary.
    pub fn stats_summary(stats: &SummaryStats) -> String {
        let mut builder = Self::new();

        builder.table.set_header(vec![
            Cell::new("Artifact").add_attribute(Attribute::Bold),
            Cell::new("Lines").add_attribute(Attribute::Bold),
        ]);

        for (name, count) in stats.rows() {
            let color = if count == 0 { Color::DarkGrey } else { Color::Green };
            builder.table.add_row(vec![
                Cell::new(name).fg(Color::Cyan),
                Cell::new(count.to_string())
                    .fg(color)
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        builder.table.to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
