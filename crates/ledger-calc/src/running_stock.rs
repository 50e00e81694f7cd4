//! 累計庫存計算
//!
//! 輸入必須是商品的**完整**異動歷史；經過篩選或分頁的子集合會得到錯誤的累計值。
//! 依商品分組、依時間穩定排序後單次掃描累加，整體 O(n log n)。

use ledger_core::{PhysicalMovement, RecordKind, SortOrder, UnifiedInventoryRecord};
use std::collections::HashMap;
use uuid::Uuid;

/// 單筆異動套用後的庫存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementBalance {
    pub movement_id: Uuid,
    pub product_id: Uuid,
    pub timestamp: i64,
    /// 帶符號的異動量
    pub delta: i64,
    pub cumulative_stock: i64,
}

/// 累計庫存計算器
pub struct RunningStockCalculator;

impl RunningStockCalculator {
    /// 依時間升冪計算每筆異動後的累計庫存
    ///
    /// 同一時間戳的異動依輸入順序處理，重複計算結果相同。
    pub fn calculate(movements: &[PhysicalMovement]) -> Vec<MovementBalance> {
        let mut order: Vec<usize> = (0..movements.len()).collect();
        order.sort_by_key(|&idx| {
            let movement = &movements[idx];
            (movement.product_id, movement.created_at.timestamp_millis(), idx)
        });

        let mut balances = Vec::with_capacity(movements.len());
        let mut current_product: Option<Uuid> = None;
        let mut running_total = 0i64;

        for idx in order {
            let movement = &movements[idx];
            if current_product != Some(movement.product_id) {
                current_product = Some(movement.product_id);
                running_total = 0;
            }

            let delta = movement.signed_quantity();
            running_total += delta;

            balances.push(MovementBalance {
                movement_id: movement.id,
                product_id: movement.product_id,
                timestamp: movement.created_at.timestamp_millis(),
                delta,
                cumulative_stock: running_total,
            });
        }

        tracing::debug!("累計庫存計算完成：異動 {} 筆", balances.len());
        balances
    }

    /// 計算後依指定方向重新排序（跨商品依時間，同時間依異動ID）
    pub fn calculate_ordered(movements: &[PhysicalMovement], sort_order: SortOrder) -> Vec<MovementBalance> {
        let mut balances = Self::calculate(movements);
        // 穩定排序：同時間戳維持計算時的順序
        balances.sort_by_key(|b| b.timestamp);
        if sort_order == SortOrder::Desc {
            balances.reverse();
        }
        balances
    }

    /// 異動ID → 累計庫存
    pub fn balance_map(movements: &[PhysicalMovement]) -> HashMap<Uuid, i64> {
        Self::calculate(movements)
            .into_iter()
            .map(|b| (b.movement_id, b.cumulative_stock))
            .collect()
    }

    /// 各商品的期末庫存
    pub fn final_balances(movements: &[PhysicalMovement]) -> HashMap<Uuid, i64> {
        let mut closing = HashMap::new();
        // 同一商品的結果依時間升冪，最後寫入者即為期末值
        for balance in Self::calculate(movements) {
            closing.insert(balance.product_id, balance.cumulative_stock);
        }
        closing
    }

    /// 把累計庫存寫回統合記錄中的實體異動，回傳寫入筆數
    pub fn apply(records: &mut [UnifiedInventoryRecord], balances: &HashMap<Uuid, i64>) -> usize {
        let mut applied = 0;
        for record in records.iter_mut() {
            match &mut record.kind {
                RecordKind::InventoryMovement(details) => {
                    details.cumulative_stock_at_time = balances.get(&record.id).copied();
                    if details.cumulative_stock_at_time.is_some() {
                        applied += 1;
                    }
                }
                RecordKind::AmountOnlyTransaction(_) => {}
            }
        }
        applied
    }
}
