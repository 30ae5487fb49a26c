use crate::analyzers::types::CorrelationMatrix;
use crate::filter::FilteredView;
use crate::schema::Measure;

/// Pearson correlation between every pair of `columns`.
///
/// Each pair uses only rows where both values are present. Fewer than two
/// such rows, or a constant column, leaves the cell empty.
pub fn correlation_matrix(view: &FilteredView, columns: &[Measure]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|&a| {
            columns
                .iter()
                .map(|&b| {
                    let pairs: Vec<(f64, f64)> = view
                        .readings
                        .iter()
                        .filter_map(|r| Some((r.value(a)?, r.value(b)?)))
                        .collect();
                    pearson(&pairs)
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
