//! 商品模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品主檔（對核心而言唯讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 商品ID
    pub id: Uuid,

    /// 顯示名稱
    pub name: String,

    /// 商品代碼（業務唯一識別）
    pub code: String,

    /// 目前庫存（核對前可能暫時為負）
    #[serde(default)]
    pub current_stock: i64,
}

impl Product {
    /// 創建新的商品
    pub fn new(id: Uuid, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            current_stock: 0,
        }
    }

    /// 建構器模式：設置目前庫存
    pub fn with_current_stock(mut self, current_stock: i64) -> Self {
        self.current_stock = current_stock;
        self
    }

    /// 取出附加在統合記錄上的快照
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            current_stock: self.current_stock,
        }
    }
}

/// 統合記錄上的商品快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub current_stock: i64,
}

impl ProductSnapshot {
    /// 商品名稱（空白視為無法解析）
    pub fn display_name(&self) -> Option<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_snapshot() {
        let id = Uuid::new_v4();
        let product = Product::new(id, "ボルト M8", "BLT-008").with_current_stock(42);
        let snapshot = product.snapshot();

        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.code, "BLT-008");
        assert_eq!(snapshot.current_stock, 42);
        assert_eq!(snapshot.display_name(), Some("ボルト M8"));
    }

    #[test]
    fn test_blank_name_is_unresolved() {
        let snapshot = Product::new(Uuid::new_v4(), "   ", "X").snapshot();
        assert_eq!(snapshot.display_name(), None);
    }
}
