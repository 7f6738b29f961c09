use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::record::{Record, Status};
use crate::utils::PoError;

/// 单个状态的汇总值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTotal {
    /// 记录数量
    pub count: usize,
    /// Total Amount 之和
    pub total_amount: Decimal,
}

/// 按状态汇总的派生视图（不落盘，每次重新计算）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// 按 Pending, Approved, Delivered 排序；没有记录的状态不出现
    pub totals: BTreeMap<Status, StatusTotal>,
    /// 所有记录的金额合计
    grand_total: Decimal,
}

impl StatusSummary {
    /// 对记录按状态分组求和
    ///
    /// 金额合计超出 `Decimal` 范围时返回 `AmountOverflow`。
    pub fn from_records(records: &[Record]) -> Result<Self, PoError> {
        let mut totals: BTreeMap<Status, StatusTotal> = BTreeMap::new();
        let mut grand_total = Decimal::ZERO;

        for record in records {
            let entry = totals.entry(record.status).or_default();
            entry.count += 1;
            entry.total_amount = entry
                .total_amount
                .checked_add(record.total_amount)
                .ok_or_else(|| PoError::AmountOverflow(record.status.to_string()))?;
            grand_total = grand_total
                .checked_add(record.total_amount)
                .ok_or_else(|| PoError::AmountOverflow("合计".to_string()))?;
        }

        Ok(StatusSummary { totals, grand_total })
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// 获取某个状态的金额合计
    pub fn total(&self, status: Status) -> Option<Decimal> {
        self.totals.get(&status).map(|t| t.total_amount)
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }
}

impl std::fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 采购单汇总 ===")?;
        writeln!(f, "{:<12} {:>6} {:>16}", "Status", "Count", "Total Value")?;
        for (status, total) in &self.totals {
            writeln!(f, "{:<12} {:>6} {:>16}", status.as_str(), total.count, total.total_amount.to_string())?;
        }
        writeln!(f, "合计: {}", self.grand_total())?;
        Ok(())
    }
}
