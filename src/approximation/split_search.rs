//! One dimensional search for the best split point of a predictor: a coarse quantile grid
//! followed by finer grids between the neighbours of the best point.
use log::debug;

const MAX_REFINEMENTS: usize = 60;

/// `count` interior quantiles of `values`, ascending and without repeats
pub fn quantile_grid(values: &[f64], count: usize) -> Vec<f64> {
    if values.is_empty() || count == 0 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let last = (sorted.len() - 1) as f64;
    let mut grid: Vec<f64> = (1..=count)
        .map(|k| {
            let position = last * k as f64 / (count + 1) as f64;
            let below = position.floor() as usize;
            let above = position.ceil() as usize;
            let weight = position - below as f64;
            sorted[below] + weight * (sorted[above] - sorted[below])
        })
        .collect();
    grid.dedup();
    grid
}

/// Minimises `score` over split points of `values`: the best point of the quantile grid is
/// refined on successively finer grids between its neighbours until the bracket is below
/// `relative_tolerance` times the range of `values`. `score` returns `None` for unusable split
/// points. Returns the best split point and its score, `None` when no split point is usable.
pub fn search_split<F>(
    values: &[f64],
    grid_size: usize,
    relative_tolerance: f64,
    score: F,
) -> Option<(f64, f64)>
where
    F: Fn(f64) -> Option<f64>,
{
    let grid = quantile_grid(values, grid_size);
    let scored = |t: f64| score(t).unwrap_or(f64::INFINITY);
    let (j, best_score) = first_minimum(grid.iter().map(|t| scored(*t)));
    if !best_score.is_finite() {
        return None;
    }
    let minimum = values.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut lower = if j > 0 { grid[j - 1] } else { minimum };
    let mut upper = if j + 1 < grid.len() { grid[j + 1] } else { maximum };
    let tolerance = relative_tolerance * (maximum - minimum);
    let mut best = (grid[j], best_score);
    let mut refinements = 0;
    while upper - lower > tolerance && refinements < MAX_REFINEMENTS {
        let step = (upper - lower) / (grid_size + 1) as f64;
        let points: Vec<f64> = (1..=grid_size).map(|k| lower + k as f64 * step).collect();
        let (k, s) = first_minimum(points.iter().map(|t| scored(*t)));
        if s < best.1 {
            best = (points[k], s);
        }
        lower = lower.max(best.0 - step);
        upper = upper.min(best.0 + step);
        refinements += 1;
    }
    debug!("best split at {} with score {:e}", best.0, best.1);
    Some(best)
}

/// index and value of the first smallest score
fn first_minimum<I: Iterator<Item = f64>>(scores: I) -> (usize, f64) {
    scores
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, s)| if s < best.1 { (i, s) } else { best })
}
