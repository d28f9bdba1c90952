mod book;
mod persistence;

pub use book::CostingBook;
pub use persistence::{
    export_tables, load_book, save_book, write_dashboard_csv, write_overhead_breakdown_csv,
};
