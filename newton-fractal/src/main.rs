use std::fs::File;
use std::io::{BufWriter, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use newton_roots::{Communicator, LocalCommunicator, SingleCommunicator};
use tracing_subscriber::filter::LevelFilter;

mod utils;
mod worker;

use crate::utils::{Settings, Summary};
use crate::worker::{run_worker, Job, WorkerReport, COORDINATOR};

fn parse_settings() -> Settings {
    match Settings::try_parse() {
        Ok(settings) => settings,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

fn main() -> Result<()> {
    let settings = parse_settings();
    let start = Instant::now();

    if settings.verbose > 0 {
        let level = if settings.verbose > 1 {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        tracing_subscriber::fmt::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }

    let num_workers = settings.jobs.unwrap_or_else(num_cpus::get).max(1);

    let bar_style = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .map_err(|e| utils::error(&e.to_string()))?;

    let job = Arc::new(Job {
        func: settings.function.build(),
        config: settings.load_config()?,
        settings: settings.clone(),
    });

    if settings.verbose == 0 {
        println!(
            "[1/2] Classifying {}x{} pixels on {num_workers} workers",
            settings.width, settings.height
        );
    }

    let mb = Arc::new(MultiProgress::new());
    let new_bar = |mb: &MultiProgress| {
        if settings.verbose == 0 {
            mb.add(ProgressBar::new(1))
        } else {
            ProgressBar::hidden()
        }
    };

    let mut reports = if num_workers == 1 {
        let pb = new_bar(&mb);
        pb.set_style(bar_style);
        let report = run_worker(&mut SingleCommunicator, &job, &pb)?;
        pb.finish_and_clear();
        vec![report]
    } else {
        let pool = threadpool::ThreadPool::new(num_workers);
        let (tx, rx) = std::sync::mpsc::channel();

        for mut comm in LocalCommunicator::group(num_workers) {
            let tx = tx.clone();
            let job = job.clone();
            let pb = new_bar(&mb);
            pb.set_style(bar_style.clone());
            pool.execute(move || {
                let result = run_worker(&mut comm, &job, &pb);
                pb.finish_and_clear();
                if let Err(e) = &result {
                    log::error!("[{}] {e}", comm.rank());
                }
                let _ = tx.send(result);
            });
        }

        // The first failure ends the run; blocked workers go down with the process.
        let reports = rx
            .into_iter()
            .take(num_workers)
            .collect::<Result<Vec<WorkerReport>>>()?;
        pool.join();
        reports
    };
    reports.sort_by_key(|report| report.rank);
    for report in &reports {
        log::debug!(
            "[{}] Rows {}..{} classified in {:.2} s",
            report.rank,
            report.rows.start,
            report.rows.end,
            report.compute.as_secs_f64()
        );
    }

    let roots = reports
        .iter_mut()
        .find(|report| report.rank == COORDINATOR)
        .and_then(|report| report.roots.take())
        .unwrap_or_default();

    if let Some(path) = &settings.roots {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &roots)?;
        log::info!("Roots written to {}", path.to_string_lossy());
    }

    let summary = Summary {
        total: start.elapsed(),
        compute: reports
            .iter()
            .map(|report| report.compute)
            .max()
            .unwrap_or(Duration::ZERO),
        pixels: settings.width * settings.height,
        workers: num_workers,
        roots: roots.len(),
    };

    if settings.verbose == 0 {
        println!("[2/2] Done");
    }
    summary.print(&settings);

    Ok(())
}
