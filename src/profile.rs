//! Memory Profiling Module
//!
//! 抽出器をラップし、呼び出し前後のプロセスのメモリ使用量（RSS）を記録する。
//! 抽出結果とエラーには一切影響しません。

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use sysinfo::{Pid, System};

use crate::error::ExtractError;
use crate::extract::Extractor;

const MIB: f64 = 1024.0 * 1024.0;

/// メモリ使用量の取得元
pub trait MemorySampler {
    /// 現在のRSS（バイト）。取得できない場合は`None`
    fn rss_bytes(&mut self) -> Option<u64>;
}

/// sysinfoで現在のプロセスのRSSを取得するサンプラー
pub struct ProcessSampler {
    system: System,
    pid: Option<Pid>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for ProcessSampler {
    fn rss_bytes(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system.refresh_process(pid);
        self.system.process(pid).map(|process| process.memory())
    }
}

/// レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub stage: String,
    pub rss_bytes: Option<u64>,
    /// 直前の行からの増分（先頭行は`None`）
    pub increment_bytes: Option<i64>,
}

/// メモリプロファイルのレポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    /// 対象ファイル
    pub source: String,
    /// 抽出器の名前
    pub extractor: String,
    pub entries: Vec<ProfileEntry>,
    pub elapsed: Duration,
}

impl ProfileReport {
    fn new(source: &Path, extractor: &str) -> Self {
        Self {
            source: source.display().to_string(),
            extractor: extractor.to_string(),
            entries: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, stage: &str, rss_bytes: Option<u64>) {
        let increment_bytes = match (self.entries.last().and_then(|e| e.rss_bytes), rss_bytes) {
            (Some(prev), Some(now)) => Some(now as i64 - prev as i64),
            _ => None,
        };
        self.entries.push(ProfileEntry {
            stage: stage.to_string(),
            rss_bytes,
            increment_bytes,
        });
    }

    /// 記録した中で最大のRSS（バイト）
    pub fn peak_rss(&self) -> Option<u64> {
        self.entries.iter().filter_map(|e| e.rss_bytes).max()
    }

    /// 計測区間全体での増分（バイト）
    pub fn total_increment(&self) -> Option<i64> {
        let first = self.entries.first()?.rss_bytes?;
        let last = self.entries.last()?.rss_bytes?;
        Some(last as i64 - first as i64)
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Filename: {}", self.source)?;
        writeln!(f, "Extractor: {}", self.extractor)?;
        writeln!(f)?;
        writeln!(f, "{:<24} {:>14} {:>14}", "Stage", "Mem usage", "Increment")?;
        writeln!(f, "{}", "=".repeat(54))?;
        for entry in &self.entries {
            let usage = entry
                .rss_bytes
                .map(|b| format!("{:.1} MiB", b as f64 / MIB))
                .unwrap_or_else(|| "n/a".to_string());
            let increment = match (entry.increment_bytes, entry.rss_bytes) {
                (Some(b), _) => format!("{:.1} MiB", b as f64 / MIB),
                (None, Some(_)) => String::new(),
                (None, None) => "n/a".to_string(),
            };
            writeln!(f, "{:<24} {:>14} {:>14}", entry.stage, usage, increment)?;
        }
        writeln!(f)?;
        if let Some(peak) = self.peak_rss() {
            writeln!(f, "Peak: {:.1} MiB", peak as f64 / MIB)?;
        }
        write!(f, "Elapsed: {:.3} s", self.elapsed.as_secs_f64())
    }
}

/// メモリプロファイルを取るラッパー
///
/// `Extractor`として使用すると、成功時にレポートを出力先（デフォルトは標準エラー）に
/// 書き込みます。レポートそのものが必要な場合は`extract_with_report()`を使用します。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxtext::{Extractor, Profiled, WorkbookExtractor};
///
/// # fn main() -> Result<(), xlsxtext::ExtractError> {
/// let profiled = Profiled::new(WorkbookExtractor::new());
/// let (text, report) = profiled.extract_with_report(Path::new("data.xlsx"))?;
/// println!("{} chars", text.chars().count());
/// eprintln!("{}", report);
/// # Ok(())
/// # }
/// ```
pub struct Profiled<E, S = ProcessSampler> {
    inner: E,
    sampler: RefCell<S>,
    sink: RefCell<Box<dyn Write>>,
}

impl<E: Extractor> Profiled<E> {
    pub fn new(inner: E) -> Self {
        Self::with_sampler(inner, ProcessSampler::new())
    }
}

impl<E: Extractor, S: MemorySampler> Profiled<E, S> {
    /// 任意のサンプラーでラップ
    pub fn with_sampler(inner: E, sampler: S) -> Self {
        Self {
            inner,
            sampler: RefCell::new(sampler),
            sink: RefCell::new(Box::new(std::io::stderr())),
        }
    }

    /// レポートの出力先を変更
    pub fn with_sink<W: Write + 'static>(self, sink: W) -> Self {
        Self {
            sink: RefCell::new(Box::new(sink)),
            ..self
        }
    }

    /// 抽出を実行し、結果とレポートを返す
    pub fn extract_with_report(&self, path: &Path) -> Result<(String, ProfileReport), ExtractError> {
        let mut report = ProfileReport::new(path, self.inner.name());
        let mut sampler = self.sampler.borrow_mut();

        let start = Instant::now();
        report.record("start", sampler.rss_bytes());
        let result = {
            let mut checkpoint = |stage: &str| report.record(stage, sampler.rss_bytes());
            self.inner.extract_staged(path, &mut checkpoint)
        };
        report.record(self.inner.name(), sampler.rss_bytes());
        report.elapsed = start.elapsed();

        if report.entries.iter().all(|e| e.rss_bytes.is_none()) {
            log::warn!("RSS is not available on this platform; memory profile is empty");
        }

        let text = result?;
        log::debug!("memory profile:\n{}", report);
        Ok((text, report))
    }
}

impl<E: Extractor, S: MemorySampler> Extractor for Profiled<E, S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let (text, report) = self.extract_with_report(path)?;

        // 出力先への書き込み失敗は抽出結果に影響させない
        let mut sink = self.sink.borrow_mut();
        if let Err(e) = writeln!(sink, "{}\n", report).and_then(|_| sink.flush()) {
            log::warn!("failed to write memory profile: {}", e);
        }

        Ok(text)
    }

    fn extract_staged(
        &self,
        path: &Path,
        checkpoint: &mut dyn FnMut(&str),
    ) -> Result<String, ExtractError> {
        self.inner.extract_staged(path, checkpoint)
    }
}
