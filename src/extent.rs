//! エクステント関連のデータ構造群.
//!
//! "エクステント"とは、レジャーの容量から切り出された、名前付きの部分領域のこと
//! (ボリュームマネージャにおける"論理ボリューム"に相当).
//!
//! サイズの単位は抽象的な"容量単位"(e.g., メガバイト)であり、`cannyvg`のレイヤで単位の変換が行われることはない.
use std::fmt;

/// エクステント.
///
/// レジャーに登録されているエクステントは、常に割当済み(`is_allocated() == true`)となる.
/// 削除されたエクステントはレジャーから完全に取り除かれるため、
/// 未割当状態のエクステントがレジャー内に残ることはない.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extent {
    name: String,
    size: u64,
    allocated: bool,
}
impl Extent {
    pub(crate) fn new(name: String, size: u64) -> Self {
        Extent {
            name,
            size,
            allocated: true,
        }
    }

    /// エクステントの名前を返す.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// エクステントのサイズ(容量単位)を返す.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// エクステントが割当済みかどうかを返す.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// エクステントの割当状態を返す.
    pub fn status(&self) -> ExtentStatus {
        if self.allocated {
            ExtentStatus::Allocated
        } else {
            ExtentStatus::NotAllocated
        }
    }
}
impl fmt::Display for Extent {
    /// 一行形式で表示する.
    ///
    /// # Examples
    ///
    /// ```
    /// use cannyvg::ledger::AllocationLedger;
    ///
    /// let mut ledger = AllocationLedger::create("VG1", 1000).unwrap();
    /// ledger.create_extent("LV1", 200).unwrap();
    ///
    /// let extent = ledger.get_extent("LV1").unwrap();
    /// assert_eq!(extent.to_string(), "Name: LV1, Size: 200, Status: Allocated");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Name: {}, Size: {}, Status: {}",
            self.name,
            self.size,
            self.status()
        )
    }
}

/// エクステントの割当状態.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtentStatus {
    /// 割当済み.
    Allocated,

    /// 未割当.
    NotAllocated,
}
impl fmt::Display for ExtentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExtentStatus::Allocated => write!(f, "Allocated"),
            ExtentStatus::NotAllocated => write!(f, "Not Allocated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let extent = Extent::new("LV1".to_owned(), 200);
        assert_eq!(extent.name(), "LV1");
        assert_eq!(extent.size(), 200);
        assert!(extent.is_allocated());
        assert_eq!(extent.status(), ExtentStatus::Allocated);
    }

    #[test]
    fn display_works() {
        let extent = Extent::new("LV2".to_owned(), 300);
        assert_eq!(extent.to_string(), "Name: LV2, Size: 300, Status: Allocated");

        assert_eq!(ExtentStatus::Allocated.to_string(), "Allocated");
        assert_eq!(ExtentStatus::NotAllocated.to_string(), "Not Allocated");
    }
}
