/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);

/// 発生し得るエラーの種別.
///
/// いずれも呼び出し元の入力(ないしサービスの状態)に起因するもので、
/// 致命的なものは存在しない.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// レジャーの容量として`0`が指定された.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して正の容量を指定する
    InvalidCapacity,

    /// エクステントのサイズとして`0`が指定された.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して正のサイズを指定する
    InvalidSize,

    /// レジャーの空き容量が、要求されたサイズに足りない.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者が不要なエクステントを削除する
    /// - より小さなサイズで作成し直す
    InsufficientSpace,

    /// 同名のエクステントが既に存在する.
    ///
    /// # 典型的な対応策
    ///
    /// - 別の名前を使う
    /// - 既存のエクステントを削除してから作成し直す
    DuplicateName,

    /// 指定された名前のエクステントが存在しない.
    NotFound,

    /// キューが詰まっている、等の過負荷状態.
    ///
    /// また、サービスの起動処理中の場合にも、このエラーが返される.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者が時間をおいてリトライする
    /// - 優先度が低いリクエストの新規発行をしばらく控える
    ServiceBusy,

    /// サービス(の管理スレッド)が停止しており、利用不可能.
    ///
    /// # 典型的な対応策
    ///
    /// - サービスを再起動する
    ServiceTerminated,
}
impl trackable::error::ErrorKind for ErrorKind {}
