pub mod survey_table;

pub use survey_table::{
    parse_survey_table, read_survey_table, read_survey_table_with_config, MissingValuePolicy,
    SurveyTable, TableReaderConfig,
};
