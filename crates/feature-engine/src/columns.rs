//! Derived column names, fixed at training time

pub const DAY_OF_WEEK: &str = "dayofweek";
pub const IS_WEEKEND: &str = "is_weekend";
pub const WEEK_OF_YEAR: &str = "weekofyear";
pub const MONTH: &str = "month";
pub const QUARTER: &str = "quarter";

pub const IS_RAIN: &str = "is_rain";
pub const PRECIP_LOG: &str = "Precip_log";

pub const TEMPERATURE_7D_MEAN: &str = "temperature_7d_mean";
pub const AQI_7D_MEAN: &str = "AQI_7d_mean";
pub const STAFFING_7D_MEAN: &str = "staffing_7d_mean";

pub const FLU_ACTIVITY: &str = "flu_activity";

pub const ADMISSIONS_LAG_1: &str = "admissions_lag_1";
pub const ADMISSIONS_LAG_7: &str = "admissions_lag_7";
pub const ADMISSIONS_LAG_14: &str = "admissions_lag_14";
pub const ADM_ROLL_7: &str = "adm_roll_7";
pub const ADM_ROLL_14: &str = "adm_roll_14";
