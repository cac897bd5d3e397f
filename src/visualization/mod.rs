mod tables;

pub use tables::{
    format_hd_comparison, print_hd_comparison,
    format_hd_parameters, print_hd_parameters,
    format_species_table, print_species_table,
    format_stand_summary, print_stand_summary,
    format_yield_table, print_yield_table,
};
