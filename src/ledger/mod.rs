//! エクステント用のレジャー.
//!
//! このモジュール自体は、I/O処理とは完全に切り離されており、純粋なデータ構造の実装である.
//!
//! 複数のスレッドから並行して操作したい場合には、[LedgerService]経由で動作させる必要がある.
//!
//! [LedgerService]: ../service/struct.LedgerService.html
use uuid::Uuid;

pub use self::allocator::SpaceAllocator;
pub use self::builder::LedgerBuilder;
pub use self::index::{ExtentIndex, Extents};

use crate::extent::Extent;
use crate::metrics::LedgerMetrics;
use crate::{ErrorKind, Result};

mod allocator;
mod builder;
mod index;

/// 固定容量のプールから、名前付きのエクステント群を切り出して管理するためのレジャー.
///
/// 以下の不変条件は、全ての操作の前後で常に成立する:
///
/// - `free_capacity() == total_capacity() - (全エクステントのサイズの合計)`
/// - 同名のエクステントは存在しない
/// - 全てのエクステントのサイズは`0`より大きい
///
/// 各操作はアトミックであり、エラーが返された場合にはレジャーの状態は一切変更されていない.
/// また、いずれのエラーも呼び出し元の入力に起因するもので、
/// エラー発生後もインスタンスを使い続けて問題はない.
///
/// # Examples
///
/// ```
/// use cannyvg::ErrorKind;
/// use cannyvg::ledger::AllocationLedger;
///
/// let mut ledger = AllocationLedger::create("VG1", 1000).unwrap();
/// ledger.create_extent("LV1", 200).unwrap();
/// ledger.create_extent("LV2", 300).unwrap();
/// assert_eq!(ledger.free_capacity(), 500);
///
/// ledger.delete_extent("LV1").unwrap();
/// assert_eq!(ledger.free_capacity(), 700);
///
/// assert_eq!(ledger.create_extent("LV3", 900).err().map(|e| *e.kind()),
///            Some(ErrorKind::InsufficientSpace));
/// ```
#[derive(Debug)]
pub struct AllocationLedger {
    name: String,
    instance_uuid: Uuid,
    allocator: SpaceAllocator,
    extent_index: ExtentIndex,
    metrics: LedgerMetrics,
}
impl AllocationLedger {
    pub(crate) fn new(
        name: String,
        instance_uuid: Uuid,
        allocator: SpaceAllocator,
        extent_index: ExtentIndex,
        metrics: LedgerMetrics,
    ) -> Self {
        AllocationLedger {
            name,
            instance_uuid,
            allocator,
            extent_index,
            metrics,
        }
    }

    /// デフォルト設定で、新規にレジャーを生成する.
    ///
    /// # Errors
    ///
    /// `total_capacity`が`0`の場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
    pub fn create<S: Into<String>>(name: S, total_capacity: u64) -> Result<Self> {
        track!(LedgerBuilder::new().create(name, total_capacity))
    }

    /// レジャーの名前を返す.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// レジャーインスタンスの識別子を返す.
    pub fn instance_uuid(&self) -> Uuid {
        self.instance_uuid
    }

    /// レジャーの総容量を返す.
    pub fn total_capacity(&self) -> u64 {
        self.allocator.capacity()
    }

    /// レジャーの空き容量を返す.
    pub fn free_capacity(&self) -> u64 {
        self.allocator.free()
    }

    /// エクステントに割り当てられている容量を返す.
    pub fn used_capacity(&self) -> u64 {
        self.allocator.used()
    }

    /// レジャーの使用状況を返す.
    pub fn usage(&self) -> LedgerUsage {
        LedgerUsage {
            total_capacity: self.total_capacity(),
            free_capacity: self.free_capacity(),
            extents: self.len(),
        }
    }

    /// レジャーのメトリクスを返す.
    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    /// エクステントを作成する.
    ///
    /// 作成されたエクステントは、一覧の末尾に追加される.
    ///
    /// # Errors
    ///
    /// 以下のいずれかの場合にはエラーが返され、レジャーの状態は変更されない
    /// (条件の判定は、この順番で行われる):
    ///
    /// - `size`が`0`: `ErrorKind::InvalidSize`
    /// - 同名のエクステントが既に存在する: `ErrorKind::DuplicateName`
    /// - `size`が空き容量を超えている: `ErrorKind::InsufficientSpace`
    pub fn create_extent<S: Into<String>>(&mut self, name: S, size: u64) -> Result<()> {
        let name = name.into();
        if size == 0 {
            self.metrics.rejected_requests.invalid_size.increment();
            track_panic!(ErrorKind::InvalidSize, "extent={:?}", name);
        }
        if self.extent_index.contains(&name) {
            self.metrics.rejected_requests.duplicate_name.increment();
            track_panic!(ErrorKind::DuplicateName, "extent={:?}", name);
        }
        track_assert!(
            self.allocator.allocate(size),
            ErrorKind::InsufficientSpace,
            "extent={:?}, size={}, free={}",
            name,
            size,
            self.allocator.free()
        );

        self.extent_index.insert(Extent::new(name, size));
        self.metrics.created_extents.increment();
        Ok(())
    }

    /// 指定された名前のエクステントを削除する.
    ///
    /// 解放された容量は空き容量に戻され、削除されたエクステントが結果として返される.
    /// 残りのエクステントの順序は維持される.
    ///
    /// # Errors
    ///
    /// 指定された名前のエクステントが存在しない場合には、
    /// 種類が`ErrorKind::NotFound`のエラーが返される.
    pub fn delete_extent(&mut self, name: &str) -> Result<Extent> {
        if let Some(extent) = self.extent_index.remove(name) {
            self.allocator.release(extent.size());
            self.metrics.deleted_extents.increment();
            Ok(extent)
        } else {
            self.metrics.rejected_requests.not_found.increment();
            track_panic!(ErrorKind::NotFound, "extent={:?}", name);
        }
    }

    /// 指定された名前のエクステントを取得する.
    ///
    /// # Errors
    ///
    /// 指定された名前のエクステントが存在しない場合には、
    /// 種類が`ErrorKind::NotFound`のエラーが返される.
    pub fn get_extent(&self, name: &str) -> Result<&Extent> {
        if let Some(extent) = self.extent_index.get(name) {
            Ok(extent)
        } else {
            self.metrics.rejected_requests.not_found.increment();
            track_panic!(ErrorKind::NotFound, "extent={:?}", name);
        }
    }

    /// 指定された名前のエクステントが存在するかどうかを返す.
    pub fn contains_extent(&self, name: &str) -> bool {
        self.extent_index.contains(name)
    }

    /// エクステントの一覧を作成順に返す.
    ///
    /// 結果はスナップショットであり、以後のレジャーの変更の影響は受けない.
    pub fn list_extents(&self) -> Vec<Extent> {
        self.extent_index.list()
    }

    /// エクステント群を作成順に走査するためのイテレータを返す.
    pub fn iter(&self) -> Extents {
        self.extent_index.iter()
    }

    /// 登録されているエクステントの数を返す.
    pub fn len(&self) -> usize {
        self.extent_index.len()
    }

    /// エクステントが一つも登録されていないかどうかを返す.
    pub fn is_empty(&self) -> bool {
        self.extent_index.is_empty()
    }
}

/// ある時点でのレジャーの使用状況.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerUsage {
    /// 総容量.
    pub total_capacity: u64,

    /// 空き容量.
    pub free_capacity: u64,

    /// 登録されているエクステントの数.
    pub extents: usize,
}
impl LedgerUsage {
    /// 使用中の容量を返す.
    pub fn used_capacity(&self) -> u64 {
        self.total_capacity - self.free_capacity
    }
}
