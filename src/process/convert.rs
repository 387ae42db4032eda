use arrow::{
    array::{
        ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, StringBuilder, UInt64Builder,
    },
    datatypes::{DataType, Field},
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Days from 0001-01-01 (CE) to the unix epoch, as used by Date32.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn date_to_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// Typed column values collected row by row, before becoming arrow arrays.
pub enum ColumnValues {
    Date(Vec<Option<NaiveDate>>),
    Utf8(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<bool>),
    Count(Vec<u64>),
}

impl ColumnValues {
    fn data_type(&self) -> DataType {
        match self {
            ColumnValues::Date(_) => DataType::Date32,
            ColumnValues::Utf8(_) => DataType::Utf8,
            ColumnValues::Float(_) => DataType::Float64,
            ColumnValues::Bool(_) => DataType::Boolean,
            ColumnValues::Count(_) => DataType::UInt64,
        }
    }

    fn nullable(&self) -> bool {
        matches!(
            self,
            ColumnValues::Date(_) | ColumnValues::Utf8(_) | ColumnValues::Float(_)
        )
    }

    /// Field + array pair for a named column.
    pub fn into_column(self, name: &str) -> (Field, ArrayRef) {
        let field = Field::new(name, self.data_type(), self.nullable());
        let array: ArrayRef = match self {
            ColumnValues::Date(values) => {
                let mut b = Date32Builder::with_capacity(values.len());
                for v in values {
                    b.append_option(v.map(date_to_days));
                }
                Arc::new(b.finish())
            }
            ColumnValues::Utf8(values) => {
                let mut b = StringBuilder::new();
                for v in values {
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            ColumnValues::Float(values) => {
                let mut b = Float64Builder::with_capacity(values.len());
                for v in values {
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            ColumnValues::Bool(values) => {
                let mut b = BooleanBuilder::with_capacity(values.len());
                for v in values {
                    b.append_value(v);
                }
                Arc::new(b.finish())
            }
            ColumnValues::Count(values) => {
                let mut b = UInt64Builder::with_capacity(values.len());
                for v in values {
                    b.append_value(v);
                }
                Arc::new(b.finish())
            }
        };
        (field, array)
    }
}
