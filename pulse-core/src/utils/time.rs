//! 时间工具函数 (业务时区时钟)
//!
//! "今天" 和打卡时间都按业务时区的本地挂钟计算，精确到分钟。
//! 引擎通过 [`Clock`] 取时间，测试注入 [`FixedClock`]。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::fmt;

/// 时钟：返回业务时区的本地时间
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> NaiveDateTime;

    /// 业务日期
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// 当前时间，截断到分钟
    fn now_minute(&self) -> NaiveTime {
        truncate_to_minute(self.now().time())
    }
}

/// 系统时钟 (业务时区)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// 固定时钟，可手动拨动
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 日期 + HH:MM
    pub fn at(date: NaiveDate, hour: u32, min: u32) -> Self {
        Self::new(date.and_time(NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    /// 同一天内拨到 HH:MM
    pub fn set_time(&self, hour: u32, min: u32) {
        let mut now = self.now.lock();
        if let Some(t) = NaiveTime::from_hms_opt(hour, min, 0) {
            *now = now.date().and_time(t);
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

/// 去掉秒和纳秒
pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// 两个 HH:MM 之间的小时数，保留两位小数，不为负
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> f64 {
    let minutes = (end - start).num_minutes().max(0);
    round2(minutes as f64 / 60.0)
}

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 解析时区名称 (IANA)，失败返回 UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!("Failed to parse timezone '{}': {}, falling back to UTC", name, e);
        Tz::UTC
    })
}

/// 是否工作日 (周一到周五)
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 闭区间内的工作日天数，end < start 时为 0
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d))
        .count() as u32
}

/// 某月第一天和最后一天
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}
