/// 貸出（在庫からの持ち出し）のエラー
///
/// アプリケーション層では `false` を返す業務上の結果として扱われる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutError {
    /// 貸出可能な冊数が0
    NoCopiesAvailable,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 貸出開始のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLoanError {
    /// 貸出日数を足すと返却期限が表現可能な日時の範囲を超える
    DueDateOutOfRange { loan_days: u32 },
}
