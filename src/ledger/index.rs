//! レジャーに登録されているエクステント群を管理するためのインデックス.
use std::collections::{btree_map, BTreeMap};

use crate::extent::Extent;

/// エクステント群を作成順に保持するインデックス.
///
/// 名前による検索・削除と、作成順での列挙の両方を効率的に行うために、
/// 「名前 => シーケンス番号」と「シーケンス番号 => エクステント」の二つのマップを保持している.
///
/// シーケンス番号は挿入の度に単調に増加し、再利用されることはない.
#[derive(Debug, Clone, Default)]
pub struct ExtentIndex {
    seqno: u64,
    names: BTreeMap<String, u64>,
    extents: BTreeMap<u64, Extent>,
}
impl ExtentIndex {
    /// 新しい`ExtentIndex`インスタンスを生成する.
    pub fn new() -> Self {
        ExtentIndex {
            seqno: 0,
            names: BTreeMap::new(),
            extents: BTreeMap::new(),
        }
    }

    /// 指定された名前のエクステントを検索する.
    pub fn get(&self, name: &str) -> Option<&Extent> {
        self.names
            .get(name)
            .and_then(|seqno| self.extents.get(seqno))
    }

    /// 指定された名前のエクステントが登録されているかどうかを返す.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// 新規エクステントを末尾に登録する.
    ///
    /// # 事前条件
    ///
    /// - 同名のエクステントが登録されていない
    pub fn insert(&mut self, extent: Extent) {
        assert!(!self.contains(extent.name()), "{:?}", extent);
        let seqno = self.seqno;
        self.seqno += 1;
        self.names.insert(extent.name().to_owned(), seqno);
        self.extents.insert(seqno, extent);
    }

    /// 指定された名前のエクステントを削除する.
    ///
    /// 残りのエクステントの順序は維持される.
    pub fn remove(&mut self, name: &str) -> Option<Extent> {
        self.names
            .remove(name)
            .and_then(|seqno| self.extents.remove(&seqno))
    }

    /// 登録されているエクステントの一覧を作成順に返す.
    pub fn list(&self) -> Vec<Extent> {
        self.extents.values().cloned().collect()
    }

    /// 登録されているエクステントを作成順に走査するためのイテレータを返す.
    pub fn iter(&self) -> Extents {
        Extents(self.extents.values())
    }

    /// インデックスのサイズ(i.e., 登録エクステント数)を返す.
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// インデックスが空かどうかを返す.
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }
}

/// エクステント群を作成順に走査するためのイテレータ.
#[derive(Debug)]
pub struct Extents<'a>(btree_map::Values<'a, u64, Extent>);
impl<'a> Iterator for Extents<'a> {
    type Item = &'a Extent;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a> ExactSizeIterator for Extents<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let mut index = ExtentIndex::new();
        index.insert(extent("c", 3));
        index.insert(extent("a", 1));
        index.insert(extent("b", 2));
        assert_eq!(names(&index), ["c", "a", "b"]);
        assert_eq!(index.len(), 3);

        assert_eq!(index.get("a"), Some(&extent("a", 1)));
        assert_eq!(index.get("z"), None);

        assert_eq!(index.remove("a"), Some(extent("a", 1)));
        assert_eq!(index.remove("a"), None);
        assert_eq!(names(&index), ["c", "b"]);

        // 再登録されたものは末尾に付く
        index.insert(extent("a", 10));
        assert_eq!(names(&index), ["c", "b", "a"]);
        assert_eq!(index.get("a").map(Extent::size), Some(10));
    }

    #[test]
    #[should_panic]
    fn duplicate_insert_panics() {
        let mut index = ExtentIndex::new();
        index.insert(extent("a", 1));
        index.insert(extent("a", 2));
    }

    fn extent(name: &str, size: u64) -> Extent {
        Extent::new(name.to_owned(), size)
    }

    fn names(index: &ExtentIndex) -> Vec<String> {
        index.iter().map(|e| e.name().to_owned()).collect()
    }
}
