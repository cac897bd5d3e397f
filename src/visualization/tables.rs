use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table,
};

use crate::config::SpeciesLibrary;
use crate::growth::{HdCoefficients, HdModel, HeightDiameterModel, ModelComparison};
use crate::models::Species;
use crate::stand::{Stand, StandMetrics};

/// Format a stand summary table as a string.
pub fn format_stand_summary(stand: &Stand) -> String {
    let metrics = stand.get_metrics();
    let dead = stand.trees().len() - stand.live_count();

    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Stand Summary".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!(
            "{} ({}) | Site Index {:.0} ft",
            stand.species().common_name(),
            stand.species(),
            stand.site_index()
        )
        .dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value", "Unit"]);

    table.add_row(vec![
        Cell::new("Stand Age"),
        Cell::new(format!("{}", metrics.age)),
        Cell::new("years"),
    ]);
    table.add_row(vec![
        Cell::new("Live Trees"),
        Cell::new(format!("{:.0}", metrics.tpa)),
        Cell::new("TPA"),
    ]);
    table.add_row(vec![
        Cell::new("Standing Dead"),
        Cell::new(format!("{dead}")),
        Cell::new("TPA"),
    ]);
    table.add_row(vec![
        Cell::new("Basal Area"),
        Cell::new(format!("{:.1}", metrics.basal_area)),
        Cell::new("sq ft/acre"),
    ]);
    table.add_row(vec![
        Cell::new("QMD"),
        Cell::new(format!("{:.1}", metrics.qmd)),
        Cell::new("inches"),
    ]);
    table.add_row(vec![
        Cell::new("Mean DBH"),
        Cell::new(format!("{:.1}", metrics.mean_dbh)),
        Cell::new("inches"),
    ]);
    table.add_row(vec![
        Cell::new("Mean Height"),
        Cell::new(format!("{:.1}", metrics.mean_height)),
        Cell::new("feet"),
    ]);
    table.add_row(vec![
        Cell::new("Top Height"),
        Cell::new(format!("{:.1}", metrics.top_height)),
        Cell::new("feet"),
    ]);
    table.add_row(vec![
        Cell::new("Volume"),
        Cell::new(format!("{:.0}", metrics.volume)),
        Cell::new("cu ft/acre"),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print a formatted stand summary table.
pub fn print_stand_summary(stand: &Stand) {
    print!("{}", format_stand_summary(stand));
}

/// Format a yield table, one row per recorded cycle, as a string.
pub fn format_yield_table(history: &[StandMetrics]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Projected Yield".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Age",
            "TPA",
            "BA (sqft/ac)",
            "QMD (in)",
            "Mean Ht (ft)",
            "Top Ht (ft)",
            "Vol (cuft/ac)",
        ]);

    for row in history {
        table.add_row(vec![
            Cell::new(format!("{}", row.age)),
            Cell::new(format!("{:.0}", row.tpa)),
            Cell::new(format!("{:.1}", row.basal_area)),
            Cell::new(format!("{:.1}", row.qmd)),
            Cell::new(format!("{:.1}", row.mean_height)),
            Cell::new(format!("{:.1}", row.top_height)),
            Cell::new(format!("{:.0}", row.volume)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the yield table.
pub fn print_yield_table(history: &[StandMetrics]) {
    print!("{}", format_yield_table(history));
}

/// Format the supported species list as a string.
pub fn format_species_table(library: &SpeciesLibrary, detailed: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Supported Species".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Code", "Common Name", "Scientific Name"];
    if detailed {
        header.extend(["Max SDI", "CA Asymptote (ft)", "Site Curve k"]);
    }
    table.set_header(header);

    for species in Species::ALL {
        let config = library.config(species);
        let mut row = vec![
            Cell::new(species.code()),
            Cell::new(species.common_name()),
            Cell::new(species.scientific_name()),
        ];
        if detailed {
            row.push(Cell::new(format!("{:.0}", config.sdi_max)));
            row.push(Cell::new(format!("{:.0}", 4.5 + config.curtis_arney.p2)));
            row.push(Cell::new(format!("{:.3}", config.site_curve.k)));
        }
        table.add_row(row);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the species list.
pub fn print_species_table(library: &SpeciesLibrary, detailed: bool) {
    print!("{}", format_species_table(library, detailed));
}

/// Format a side-by-side height model comparison as a string.
pub fn format_hd_comparison(comparison: &ModelComparison) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Height Model Comparison".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!(
            "{} ({})",
            comparison.species.common_name(),
            comparison.species
        )
        .dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "DBH (in)",
            "Curtis-Arney (ft)",
            "Wykoff (ft)",
            "Difference (ft)",
        ]);

    for ((dbh, ca), wy) in comparison
        .dbh
        .iter()
        .zip(&comparison.curtis_arney)
        .zip(&comparison.wykoff)
    {
        table.add_row(vec![
            Cell::new(format!("{dbh:.1}")),
            Cell::new(format!("{ca:.1}")),
            Cell::new(format!("{wy:.1}")),
            Cell::new(format!("{:+.1}", ca - wy)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the height model comparison.
pub fn print_hd_comparison(comparison: &ModelComparison) {
    print!("{}", format_hd_comparison(comparison));
}

/// Format the coefficient sets behind both height models as a string.
pub fn format_hd_parameters(model: &HeightDiameterModel) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        "Height Model Coefficients".bold().green()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Model", "Coefficients"]);

    for kind in [HdModel::CurtisArney, HdModel::Wykoff] {
        let (name, coefficients) = match model.model_parameters(kind) {
            HdCoefficients::CurtisArney(c) => (
                "Curtis-Arney",
                format!(
                    "p2 = {:.4}, p3 = {:.4}, p4 = {:.4}, dbw = {:.1}",
                    c.p2, c.p3, c.p4, c.dbw
                ),
            ),
            HdCoefficients::Wykoff(w) => {
                ("Wykoff", format!("b1 = {:.4}, b2 = {:.4}", w.b1, w.b2))
            }
        };
        table.add_row(vec![Cell::new(name), Cell::new(coefficients)]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the height model coefficient table.
pub fn print_hd_parameters(model: &HeightDiameterModel) {
    print!("{}", format_hd_parameters(model));
}
