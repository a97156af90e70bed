mod mapping;
mod report;
mod row;

pub use mapping::{MappingEntry, MappingGroup, TableKey};
pub use report::{RunReport, TableReport};
pub use row::Row;
