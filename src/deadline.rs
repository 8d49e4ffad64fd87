//! サービスに発行されるリクエストの優先順位.
use std::time::Duration;

/// リクエストのデッドライン.
///
/// サービスに並行して発行されたリクエスト群は、デッドラインが近い順に処理される.
///
/// あくまでも処理順序を決定するためのもので、デッドラインを過ぎたリクエストが破棄されることはない.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deadline {
    /// 即座に処理されるべきリクエスト.
    Immediate,

    /// 指定された期間内に処理されるべきリクエスト.
    Within(Duration),

    /// 期限の無いリクエスト.
    Infinity,
}
impl Default for Deadline {
    /// `Deadline::Infinity`を返す.
    fn default() -> Self {
        Deadline::Infinity
    }
}
