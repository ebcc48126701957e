mod executor;

pub use executor::{
    parse_domains_from_file, read_domains_file, BatchReport, BatchRunner, ProgressCallback,
};
