//! GES連携モジュール
//!
//! スキャン処理後にChrome上のGES画面をosascriptで操作し、LOTを撮影済みにする。
//! 3段階の操作（検索→チェック→確定）で、検索後は画面描画を待つため固定時間
//! 停止する。全ての失敗は警告ログのみでセッションには影響しない。

use std::time::Duration;

/// 撮影済み通知の抽象
///
/// 実装はエラーを内部で握りつぶすこと。呼び出し側の制御フローを変えない。
#[allow(async_fn_in_trait)]
pub trait LotNotifier {
    async fn mark_as_shot(&self, lot_num: &str);
}

/// 何もしない通知（テスト・--no-mark-shot用）
pub struct NoopNotifier;

impl LotNotifier for NoopNotifier {
    async fn mark_as_shot(&self, _lot_num: &str) {}
}

/// Chrome上のGES画面をosascriptで操作する通知
pub struct GesAutomation {
    stage_timeout: Duration,
    render_wait: Duration,
}

const CHECKMARK_SCRIPT: &str = r#"
tell application "Google Chrome" to activate
tell application "Google Chrome" to tell active tab in front window to execute javascript "document.getElementsByClassName('checkmark')[0].click();"
"#;

const PRIMARY_SCRIPT: &str = r#"
tell application "Google Chrome" to activate
tell application "Google Chrome" to tell active tab in front window to execute javascript "document.getElementsByClassName('Primary vertMarginSml SubChoiceHide')[0].click();"
"#;

impl GesAutomation {
    pub fn new(stage_timeout_seconds: u64, render_wait_seconds: u64) -> Self {
        Self {
            stage_timeout: Duration::from_secs(stage_timeout_seconds),
            render_wait: Duration::from_secs(render_wait_seconds),
        }
    }

    fn search_script(lot_num: &str) -> String {
        let escaped = escape_js(lot_num);
        format!(
            "\ntell application \"Google Chrome\" to activate\n\
             tell application \"Google Chrome\" to tell active tab in front window to execute javascript \
             \"document.getElementsByClassName('srchText')[0].value = '{}'; \
             document.getElementsByClassName('srchButton')[0].click();\"\n",
            escaped
        )
    }

    async fn run_stage(&self, label: &str, script: &str) {
        let output = tokio::time::timeout(
            self.stage_timeout,
            tokio::process::Command::new("osascript")
                .arg("-e")
                .arg(script)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Err(_) => println!("⚠ GES連携がタイムアウトしました ({})", label),
            Ok(Err(e)) => println!("⚠ GES連携の実行に失敗しました ({}): {}", label, e),
            Ok(Ok(out)) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                println!("⚠ GES連携がエラーを返しました ({}): {}", label, stderr.trim());
            }
            Ok(Ok(_)) => {}
        }
    }
}

impl LotNotifier for GesAutomation {
    async fn mark_as_shot(&self, lot_num: &str) {
        if !cfg!(target_os = "macos") {
            println!("⚠ GES連携はmacOSのみ対応のためスキップします");
            return;
        }

        self.run_stage("検索", &Self::search_script(lot_num)).await;

        // 検索結果の描画を待ってから次の操作対象が現れる
        tokio::time::sleep(self.render_wait).await;

        self.run_stage("チェック", CHECKMARK_SCRIPT).await;
        self.run_stage("確定", PRIMARY_SCRIPT).await;
    }
}

/// JavaScript文字列リテラル用エスケープ
fn escape_js(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_js() {
        assert_eq!(escape_js("L100"), "L100");
        assert_eq!(escape_js("L'100"), "L\\'100");
        assert_eq!(escape_js(r#"L"100"#), "L\\\"100");
        assert_eq!(escape_js(r"L\100"), r"L\\100");
    }

    #[test]
    fn test_search_script_embeds_escaped_lot() {
        let script = GesAutomation::search_script("L'100");
        assert!(script.contains("srchText"));
        assert!(script.contains("srchButton"));
        assert!(script.contains("L\\'100"));
    }

    #[tokio::test]
    async fn test_noop_notifier_does_nothing() {
        NoopNotifier.mark_as_shot("L100").await;
    }
}
