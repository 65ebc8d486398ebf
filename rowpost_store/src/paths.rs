use crate::TableName;

pub fn format_record_path(table: &TableName, record_id: &str) -> String {
    format!("{}/{}.json", table, record_id)
}
