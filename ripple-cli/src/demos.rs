//! Tutorial demos
//!
//! Each demo builds a small pipeline, subscribes, and collects what the
//! observers print into a [`DemoOutput`] so the runner decides how to show it.

use crate::config::TimingConfig;
use anyhow::Result;
use clap::ValueEnum;
use parking_lot::Mutex;
use ripple::{Observable, Observer, RxError};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

const HEROES: [&str; 5] = ["Bruce", "Ed", "Tony", "Alfred", "Robin"];
const CREW: [&str; 5] = ["Jack", "Ed", "Bruce", "Alfred", "Steve"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Print every emission of a fixed list
    Print,
    /// Map strings to their lengths
    PrintLengths,
    /// Timer emissions over an observe window
    Interval,
    /// Hand-written emitter calling next/complete
    OnNext,
    /// Emitter failure routed to the error handler
    OnError,
    /// map + filter chain
    IntermediateOps,
    /// Observable::just
    Just,
    /// Observable::from_iterable
    FromIterable,
    /// Observer trait implementation
    ImplementingObserver,
    /// next/error/complete closures
    ObserverWithLambdas,
    /// Cold replay per subscriber
    Cold,
    /// publish + connect multicast
    Connectable,
    /// Hot timer with a late subscriber
    HotInterval,
    /// Observable::range
    Range,
    /// Observable::empty
    Empty,
    /// Observable::never
    Never,
}

impl Demo {
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_else(|| format!("{:?}", self))
    }

    pub fn about(&self) -> String {
        self.to_possible_value()
            .and_then(|value| value.get_help().map(|help| help.to_string()))
            .unwrap_or_default()
    }
}

/// Lines printed by the observers of one demo
#[derive(Clone, Default)]
pub struct DemoOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl DemoOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    /// `next` handler printing `prefix` followed by the value
    pub fn printer<T: Display>(&self, prefix: &'static str) -> impl FnMut(T) + Send + use<T> {
        let out = self.clone();
        move |value| out.line(format!("{prefix}{value}"))
    }

    pub fn error_printer(&self) -> impl FnMut(RxError) + Send + use<> {
        let out = self.clone();
        move |err| out.line(format!("ERROR => {err}"))
    }

    pub fn done_printer(&self) -> impl FnMut() + Send + use<> {
        let out = self.clone();
        move || out.line("Done")
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

/// Observer written out by hand instead of with closures
struct LengthPrinter {
    out: DemoOutput,
}

impl Observer<usize> for LengthPrinter {
    fn next(&mut self, value: usize) {
        self.out.line(format!("Received => {value}"));
    }

    fn error(&mut self, error: RxError) {
        self.out.line(format!("ERROR => {error}"));
    }

    fn complete(&mut self) {
        self.out.line("Done");
    }
}

fn heroes_by_hand(fail_after: Option<usize>) -> Observable<&'static str> {
    Observable::create(move |emitter| {
        for (index, hero) in HEROES.iter().enumerate() {
            if fail_after == Some(index) {
                return Err(format!("emitter gave up after {index} heroes").into());
            }
            emitter.next(*hero);
        }
        emitter.complete();
        Ok(())
    })
}

/// Run one demo and return what its observers printed
pub async fn run(demo: Demo, timing: &TimingConfig) -> Result<Vec<String>> {
    debug!("Running demo {}", demo.name());
    let out = DemoOutput::new();

    match demo {
        Demo::Print => {
            Observable::just(CREW)?.subscribe_next(out.printer(""));
        }
        Demo::PrintLengths => {
            Observable::just(CREW)?
                .map(|s| s.len())
                .subscribe_next(out.printer(""));
        }
        Demo::Interval => {
            let sub = Observable::interval(timing.interval_period())?
                .subscribe_next(out.printer(""));
            tokio::time::sleep(timing.observe_window()).await;
            sub.dispose();
        }
        Demo::OnNext => {
            heroes_by_hand(None).subscribe_next(out.printer("RECEIVED => "));
        }
        Demo::OnError => {
            heroes_by_hand(Some(2))
                .subscribe_next_error(out.printer("RECEIVED => "), out.error_printer());
        }
        Demo::IntermediateOps => {
            heroes_by_hand(None)
                .map(|s| s.len())
                .filter(|len| *len <= 4)
                .subscribe_next(out.printer("RECEIVED => "));
        }
        Demo::Just => {
            Observable::just(HEROES)?.subscribe_next(out.printer("RECEIVED => "));
        }
        Demo::FromIterable => {
            let list: Vec<String> = HEROES.iter().map(|s| s.to_string()).collect();
            Observable::from_iterable(list).subscribe_next(out.printer("RECEIVED => "));
        }
        Demo::ImplementingObserver => {
            Observable::just(HEROES)?
                .map(|s| s.len())
                .subscribe_with(LengthPrinter { out: out.clone() });
        }
        Demo::ObserverWithLambdas => {
            Observable::just(HEROES)?.map(|s| s.len()).subscribe(
                out.printer("Received => "),
                out.error_printer(),
                out.done_printer(),
            );
        }
        Demo::Cold => {
            let source = Observable::just(HEROES)?;
            source.subscribe_next(out.printer("Observer 1 => "));
            source.subscribe_next(out.printer("Observer 2 => "));

            out.line("########## Mutation demo ##########");
            source.subscribe_next(out.printer("Observer 1 => "));
            source
                .map(|s| s.len())
                .subscribe_next(out.printer("Observer 2 => "));
        }
        Demo::Connectable => {
            let hot = Observable::just(HEROES)?.publish();
            hot.subscribe_next(out.printer("Observer 1 => "))?;
            hot.subscribe_next(out.printer("Observer 2 => "))?;
            hot.connect()?;
        }
        Demo::HotInterval => {
            let hot = Observable::interval(timing.interval_period())?.publish();
            hot.subscribe_next(out.printer("Observer 1 => "))?;
            hot.connect()?;

            let half = timing.observe_window() / 2;
            tokio::time::sleep(half).await;
            out.line("Observer 2 subscribes");
            hot.subscribe_next(out.printer("Observer 2 => "))?;
            tokio::time::sleep(half).await;
            hot.disconnect();
        }
        Demo::Range => {
            Observable::range(5, 5)?.subscribe_next(out.printer("Received => "));
        }
        Demo::Empty => {
            Observable::<String>::empty().subscribe(
                out.printer("Received => "),
                out.error_printer(),
                out.done_printer(),
            );
        }
        Demo::Never => {
            let sub = Observable::<String>::never().subscribe(
                out.printer("Received => "),
                out.error_printer(),
                out.done_printer(),
            );
            tokio::time::sleep(timing.observe_window()).await;
            sub.dispose();
            out.line(format!(
                "No emissions after {} ms",
                timing.observe_window().as_millis()
            ));
        }
    }

    Ok(out.lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> TimingConfig {
        TimingConfig {
            interval_period_ms: 10,
            observe_window_ms: 60,
        }
    }

    async fn lines(demo: Demo) -> Vec<String> {
        run(demo, &fast()).await.unwrap()
    }

    #[tokio::test]
    async fn test_print_and_lengths() {
        assert_eq!(lines(Demo::Print).await, CREW.to_vec());
        assert_eq!(lines(Demo::PrintLengths).await, vec!["4", "2", "5", "6", "5"]);
    }

    #[tokio::test]
    async fn test_intermediate_ops() {
        assert_eq!(
            lines(Demo::IntermediateOps).await,
            vec!["RECEIVED => 2", "RECEIVED => 4"]
        );
    }

    #[tokio::test]
    async fn test_on_error_reaches_handler() {
        let out = lines(Demo::OnError).await;
        assert_eq!(out[..2], ["RECEIVED => Bruce", "RECEIVED => Ed"]);
        assert_eq!(out.len(), 3);
        assert!(out[2].starts_with("ERROR => Emission error: emitter gave up"));
    }

    #[tokio::test]
    async fn test_observer_styles_agree() {
        let by_hand = lines(Demo::ImplementingObserver).await;
        let lambdas = lines(Demo::ObserverWithLambdas).await;
        assert_eq!(by_hand, lambdas);
        assert_eq!(by_hand.last().map(String::as_str), Some("Done"));
        assert_eq!(by_hand.len(), 6);
    }

    #[tokio::test]
    async fn test_cold_replays_then_connectable_interleaves() {
        let cold = lines(Demo::Cold).await;
        assert_eq!(cold.len(), 21);
        assert_eq!(cold[0], "Observer 1 => Bruce");
        assert_eq!(cold[5], "Observer 2 => Bruce");
        assert_eq!(cold[20], "Observer 2 => 5");

        let hot = lines(Demo::Connectable).await;
        assert_eq!(hot[..4], [
            "Observer 1 => Bruce",
            "Observer 2 => Bruce",
            "Observer 1 => Ed",
            "Observer 2 => Ed",
        ]);
        assert_eq!(hot.len(), 10);
    }

    #[tokio::test]
    async fn test_range_empty_never() {
        assert_eq!(
            lines(Demo::Range).await,
            vec![
                "Received => 5",
                "Received => 6",
                "Received => 7",
                "Received => 8",
                "Received => 9",
            ]
        );
        assert_eq!(lines(Demo::Empty).await, vec!["Done"]);
        assert_eq!(lines(Demo::Never).await, vec!["No emissions after 60 ms"]);
    }

    #[tokio::test]
    async fn test_timer_demos_emit() {
        let ticks = lines(Demo::Interval).await;
        assert!(!ticks.is_empty());
        assert_eq!(ticks[0], "0");

        let hot = lines(Demo::HotInterval).await;
        let marker = hot
            .iter()
            .position(|line| line == "Observer 2 subscribes")
            .unwrap();
        assert!(hot[..marker].iter().all(|l| l.starts_with("Observer 1")));
        assert!(!hot.iter().any(|l| l == "Observer 2 => 0"));
    }

    #[test]
    fn test_demo_names() {
        assert_eq!(Demo::IntermediateOps.name(), "intermediate-ops");
        assert!(!Demo::Never.about().is_empty());
    }
}
