//! Canny Volume Group.
//!
//! `cannyvg`は、固定容量のプール(レジャー)から、名前付きの部分領域(エクステント)を切り出して管理するための、
//! メモリ上の割当台帳.
//!
//! ボリュームマネージャにおける「ボリュームグループ」と「論理ボリューム」の関係を抽象化したもので、
//! アリーナアロケータやブロックストレージ管理の基盤となるデータ構造である.
//!
//! # 特徴
//!
//! - 各[レジャー][ledger]は作成時に指定された容量を持ち、その容量は以後変更されない
//! - エクステントの作成・削除・検索・列挙が可能
//!   - エクステントの名前はレジャー内で一意
//!   - 列挙結果は作成順に並ぶ
//! - 全ての操作は同期的かつアトミックで、失敗した操作は状態を一切変更しない
//! - 永続化や物理デバイスへのI/Oは行わない
//!
//! # モジュールの依存関係
//!
//! ```text
//! service => ledger => extent
//! ```
//!
//! - [service]モジュール:
//!   - 主に[LedgerService]構造体を提供
//!   - 一つのレジャーを専有する管理スレッドを起動し、複数の利用者からのリクエストを直列化して処理する
//! - [ledger]モジュール:
//!   - 主に[AllocationLedger]構造体を提供
//!   - 容量の計算とエクステント群の管理を担当する
//! - [extent]モジュール:
//!   - エクステントのデータ構造を提供
//!
//! [ledger]: ./ledger/index.html
//! [service]: ./service/index.html
//! [LedgerService]: ./service/struct.LedgerService.html
//! [AllocationLedger]: ./ledger/struct.AllocationLedger.html
//! [extent]: ./extent/index.html
#![warn(missing_docs)]
#[cfg(feature = "fibers")]
extern crate fibers;
#[cfg(test)]
extern crate fibers_global;
#[cfg(feature = "futures")]
extern crate futures;
extern crate prometrics;
#[cfg(test)]
extern crate proptest;
#[macro_use]
extern crate trackable;
extern crate uuid;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

pub mod deadline;
pub mod extent;
pub mod ledger;
pub mod metrics;
#[cfg(feature = "service")]
pub mod service;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
