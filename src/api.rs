//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 抽出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ExtractionMethod {
    /// ドキュメントローダーが返すチャンクを連結する
    ///
    /// チャンクの分割・セルの区切り・空白の扱いはローダー側の方針に従います。
    /// 内部の空白は正規化されません。
    Loader,

    /// ワークブックを読み取り専用・値のみモードで開き、セルを順に走査する（デフォルト）
    ///
    /// 各セルの前後の空白を除去し、内部の連続空白を1つのスペースにまとめます。
    ///
    /// # 出力例
    ///
    /// ```text
    /// Name Age
    /// Alice 30
    /// ```
    #[default]
    Workbook,
}

impl ExtractionMethod {
    /// ログやプロファイルレポートで使用する名前
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Loader => "loader",
            ExtractionMethod::Workbook => "workbook",
        }
    }
}

/// ドキュメントローダーのチャンク分割方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum LoaderMode {
    /// ワークブック全体を1つのドキュメントとして返す（デフォルト）
    ///
    /// シートごとのテキストは空行（`"\n\n"`）で区切られます。
    #[default]
    Single,

    /// 空でないシートごとに1つのドキュメントを返す
    ///
    /// メタデータに`page_name`（シート名）と`page_number`（1始まり）が含まれます。
    Elements,
}
