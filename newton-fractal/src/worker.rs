use std::fs::File;
use std::io::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use newton_roots::{
    find_roots, output, partition, Classifier, Communicator, Config, Func, Grid, Roots, WorkRange,
};

use crate::utils::{error, Settings, Strategy};

/// Rank that discovers the roots and owns the file header.
pub const COORDINATOR: usize = 0;

/// Everything a worker needs, shared read-only between them.
pub struct Job {
    pub settings: Settings,
    pub config: Config,
    pub func: Arc<dyn Func + Send + Sync>,
}

#[derive(Debug)]
pub struct WorkerReport {
    pub rank: usize,
    pub rows: WorkRange,
    pub compute: Duration,
    /// Only set on the coordinator.
    pub roots: Option<Roots>,
}

fn share_roots<C: Communicator>(comm: &mut C, roots: Option<&Roots>) -> Result<Roots> {
    let count = comm.broadcast(COORDINATOR, roots.map(Roots::len))?;
    let (re, im) = match roots.map(Roots::to_parts) {
        Some((re, im)) => (Some(re), Some(im)),
        None => (None, None),
    };
    let re = comm.broadcast(COORDINATOR, re)?;
    let im = comm.broadcast(COORDINATOR, im)?;
    if re.len() != count || im.len() != count {
        return Err(error(&format!(
            "Expected {count} roots, received {} and {} parts",
            re.len(),
            im.len()
        )));
    }
    Ok(Roots::from_parts(&re, &im))
}

pub fn run_worker<C: Communicator>(comm: &mut C, job: &Job, pb: &ProgressBar) -> Result<WorkerReport> {
    let start = Instant::now();
    let rank = comm.rank();
    let settings = &job.settings;
    let grid = Grid::new(settings.bounds(), settings.width, settings.height);

    let discovered = if comm.is_root(COORDINATOR) {
        pb.set_message("Searching roots");
        let store = find_roots(&*job.func, grid.bounds.region(), &job.config.search);
        log::info!("[{rank}] Found {} roots", store.len());
        Some(store.freeze())
    } else {
        None
    };

    pb.set_message("Waiting for roots");
    let roots = share_roots(comm, discovered.as_ref())?;
    for (i, z) in roots.iter().enumerate() {
        log::debug!("[{rank}] Root {i}: {z}");
    }

    let rows = partition(grid.height, comm.size())
        .get(rank)
        .copied()
        .ok_or_else(|| error(&format!("No rows for worker {rank}")))?;
    log::debug!("[{rank}] Rows {}..{}", rows.start, rows.end);

    pb.set_message(format!("Rows {}..{}", rows.start, rows.end));
    pb.set_length(rows.len() as u64);
    let classifier = Classifier::new(&*job.func, &roots, job.config.classify);
    let results = classifier.classify_rows(&grid, rows, |_| pb.inc(1));
    let compute = start.elapsed();

    pb.set_message("Writing");
    match settings.strategy {
        Strategy::Offset => {
            let bytes = output::to_bytes(&results);
            if comm.is_root(COORDINATOR) {
                output::create_shared(&settings.output)?;
            }
            let span =
                comm.exclusive_scan_scatter(COORDINATOR, output::header_len(), bytes.len() as u64)?;
            if comm.is_root(COORDINATOR) {
                output::reserve_shared(&settings.output, span.total)?;
            }
            log::debug!("[{rank}] Writing {} bytes at {}", bytes.len(), span.offset);
            output::write_at(&settings.output, span.offset, &bytes)?;
        }
        Strategy::Gather => {
            if let Some(shards) = comm.gather(COORDINATOR, results)? {
                let file = File::create(&settings.output)?;
                output::write_csv(file, &shards.concat())?;
            }
        }
    }

    Ok(WorkerReport {
        rank,
        rows,
        compute,
        roots: discovered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use newton_roots::{LocalCommunicator, SingleCommunicator};

    fn job(strategy: &str, output: &std::path::Path) -> Arc<Job> {
        let output = output.to_string_lossy().into_owned();
        let settings = Settings::try_parse_from([
            "newton-fractal",
            "23",
            "17",
            "-1.5",
            "1.5",
            "-1.5",
            "1.5",
            "--strategy",
            strategy,
            "--output",
            output.as_str(),
        ])
        .unwrap();
        Arc::new(Job {
            func: settings.function.build(),
            config: Config::default(),
            settings,
        })
    }

    fn run_group(job: &Arc<Job>, workers: usize) -> Vec<WorkerReport> {
        std::thread::scope(|s| {
            let handles = LocalCommunicator::group(workers)
                .into_iter()
                .map(|mut comm| {
                    let job = job.clone();
                    s.spawn(move || run_worker(&mut comm, &job, &ProgressBar::hidden()).unwrap())
                })
                .collect::<Vec<_>>();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("newton-fractal-{}-{name}", std::process::id()))
    }

    #[test]
    fn strategies_and_worker_counts_agree() {
        let reference = temp_path("single.csv");
        let job_single = job("offset", &reference);
        let report = run_worker(&mut SingleCommunicator, &job_single, &ProgressBar::hidden()).unwrap();
        assert_eq!(report.roots.map(|r| r.len()), Some(3));
        let expected = std::fs::read(&reference).unwrap();

        let text = String::from_utf8(expected.clone()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("root_idx,iterations"));
        assert_eq!(lines.count(), 23 * 17);

        for (strategy, workers) in [("offset", 4), ("gather", 3), ("offset", 20)] {
            let path = temp_path(&format!("{strategy}-{workers}.csv"));
            let reports = run_group(&job(strategy, &path), workers);
            assert_eq!(reports.iter().map(|r| r.rows.len()).sum::<usize>(), 17);
            assert!(reports[1..].iter().all(|r| r.roots.is_none()));
            assert_eq!(std::fs::read(&path).unwrap(), expected, "{strategy} {workers}");
            std::fs::remove_file(&path).unwrap();
        }
        std::fs::remove_file(&reference).unwrap();
    }

    #[test]
    fn unwritable_output_fails() {
        let job = job("offset", std::path::Path::new("/nonexistent-dir/out.csv"));
        assert!(run_worker(&mut SingleCommunicator, &job, &ProgressBar::hidden()).is_err());
    }
}
