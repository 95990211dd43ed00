use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tadabbur_core::presentation::ResultsView;
use tadabbur_types::{
    AppEvent, CropRect, DisplaySize, ImagePreview, Language, PreviewStage, RetryTarget, Route,
    UiEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

const RECENT_REFLECTIONS: usize = 3;

const HELP: &str = "\
Commands:
  camera                   open the camera
  capture                  take the photo
  confirm | retake         keep the photo and crop it, or take another
  display <w> <h> | none   size the preview is shown at
  crop <x> <y> <w> <h>     selection over the shown preview
  save                     crop and send for processing
  text <language> <verse>  process typed text (Arabic, English, French)
  accept | reject          open or discard the extracted ayah
  retry | reset | status
  quit";

/// What one line of input asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(UiEvent),
    Help,
    Nothing,
}

fn numbers<const N: usize>(args: &[&str], usage: &str) -> Result<[f64; N], String> {
    if args.len() != N {
        return Err(format!("usage: {usage}"));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| format!("not a number: {arg} (usage: {usage})"))?;
    }
    Ok(out)
}

pub fn parse_command(line: &str, default_language: Language) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Nothing);
    };
    let args: Vec<&str> = words.collect();

    let event = match head.to_lowercase().as_str() {
        "help" | "?" => return Ok(Command::Help),
        "camera" => UiEvent::StartCamera,
        "capture" => UiEvent::Capture,
        "confirm" => UiEvent::ConfirmPreview,
        "retake" => UiEvent::Retake,
        "display" if args == ["none"] => UiEvent::DisplaySizeChanged(None),
        "display" => {
            let [w, h] = numbers::<2>(&args, "display <w> <h> | display none")?;
            UiEvent::DisplaySizeChanged(Some(DisplaySize::new(w, h)))
        }
        "crop" => {
            let [x, y, w, h] = numbers::<4>(&args, "crop <x> <y> <w> <h>")?;
            UiEvent::UpdateCrop(CropRect::new(x, y, w, h))
        }
        "save" => UiEvent::SaveCrop,
        "reset" => UiEvent::Reset,
        "text" => {
            let (language, verse) = match args.split_first() {
                Some((first, rest)) => match first.parse::<Language>() {
                    Ok(language) => (language, rest.join(" ")),
                    Err(_) => (default_language, args.join(" ")),
                },
                None => (default_language, String::new()),
            };
            UiEvent::SubmitText {
                text: verse,
                language,
            }
        }
        "accept" => UiEvent::AcceptResult,
        "reject" => UiEvent::RejectResult,
        "retry" => UiEvent::Retry,
        "status" => UiEvent::Status,
        "quit" | "exit" => UiEvent::Close,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Command::Send(event))
}

/// Terminal front end: reads commands from stdin, prints what the backend reports
pub async fn ui_loop(
    state: Arc<AppState>,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    ui_to_app_tx.send(AppEvent::UiEvent(UiEvent::Close)).await?;
                    break;
                };
                let language = state.config.read().await.ui.language;
                match parse_command(&line, language) {
                    Ok(Command::Send(event)) => {
                        let closing = matches!(event, UiEvent::Close);
                        ui_to_app_tx.send(AppEvent::UiEvent(event)).await?;
                        if closing {
                            break;
                        }
                    }
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Nothing) => {}
                    Err(message) => println!("{message}"),
                }
            }
            event = app_to_ui_rx.recv() => {
                render(&state, event?).await;
            }
        }
    }

    Ok(())
}

fn describe_preview(preview: &ImagePreview) -> String {
    let stage = match preview.stage {
        PreviewStage::Captured => "Captured",
        PreviewStage::Cropped => "Cropped",
    };
    format!(
        "{stage} image {}x{} ({} bytes encoded)",
        preview.width,
        preview.height,
        preview.image.as_str().len()
    )
}

async fn render(state: &AppState, event: AppEvent) {
    match event {
        AppEvent::BackendReady => println!("Tadabbur ready."),
        AppEvent::StatusUpdate {
            state: kind,
            message,
        } => println!("[{kind}] {message}"),
        AppEvent::ShowImage(preview) => println!("{}", describe_preview(&preview)),
        AppEvent::ShowError(notice) => {
            let target = match notice.retry {
                RetryTarget::Idle => "start",
                RetryTarget::CameraActive => "the camera",
            };
            println!("Error: {}", notice.kind.user_message());
            println!("  {} (retry returns to {target})", notice.message);
        }
        AppEvent::Navigate(route) => match route {
            Route::Home => {
                let cards = state.recent_cards(RECENT_REFLECTIONS).await;
                if !cards.is_empty() {
                    println!("Recent Reflections");
                    for card in cards {
                        println!("{card}\n");
                    }
                }
            }
            Route::Camera => println!("-- Camera --"),
            Route::Waiting { language } => println!("Processing your {language} text..."),
            Route::Results(result) => println!("{}", ResultsView::from(&result)),
        },
        AppEvent::UiEvent(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line, Language::Arabic).unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("camera"), Command::Send(UiEvent::StartCamera));
        assert_eq!(parse("  CAPTURE "), Command::Send(UiEvent::Capture));
        assert_eq!(parse("quit"), Command::Send(UiEvent::Close));
        assert_eq!(parse(""), Command::Nothing);
        assert_eq!(parse("help"), Command::Help);
    }

    #[test]
    fn test_geometry_commands() {
        assert_eq!(
            parse("crop 10 10 100 50"),
            Command::Send(UiEvent::UpdateCrop(CropRect::new(10.0, 10.0, 100.0, 50.0)))
        );
        assert_eq!(
            parse("display 300 400"),
            Command::Send(UiEvent::DisplaySizeChanged(Some(DisplaySize::new(300.0, 400.0))))
        );
        assert_eq!(parse("display none"), Command::Send(UiEvent::DisplaySizeChanged(None)));
        assert!(parse_command("crop 1 2 3", Language::Arabic).is_err());
        assert!(parse_command("display wide 3", Language::Arabic).is_err());
    }

    #[test]
    fn test_text_language_is_optional() {
        assert_eq!(
            parse("text french بِسْمِ اللَّهِ"),
            Command::Send(UiEvent::SubmitText {
                text: "بِسْمِ اللَّهِ".into(),
                language: Language::French,
            })
        );
        assert_eq!(
            parse("text بِسْمِ اللَّهِ"),
            Command::Send(UiEvent::SubmitText {
                text: "بِسْمِ اللَّهِ".into(),
                language: Language::Arabic,
            })
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("scan", Language::Arabic).unwrap_err();
        assert!(err.contains("unknown command: scan"));
    }
}
