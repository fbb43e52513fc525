use super::point::Point;
use crate::basic::Index;

/// Indices of `points` reordered along a Morton (Z-order) curve.
///
/// Median splits along cyclically shifted axes, following the reflected
/// bucket pattern of Delage & Devillers' spatial sorting.
pub fn morton_mapping<const D: usize>(points: &[Point<D>]) -> Vec<Index> {
    let mut mapping: Vec<Index> = (0..points.len() as Index).collect();
    morton_recurse(points, &mut mapping, 0);
    mapping
}

fn morton_recurse<const D: usize>(points: &[Point<D>], range: &mut [Index], axis: usize) {
    if range.len() <= 1 {
        return;
    }
    let buckets = split_buckets(points, range, axis);
    for (position, bucket) in buckets.into_iter().enumerate() {
        morton_recurse(points, bucket, bucket_axis::<D>(axis, position));
    }
}

/// Splits `range` into `2^D` equal buckets with one median split per axis,
/// starting at `axis`.
fn split_buckets<'a, const D: usize>(
    points: &[Point<D>],
    range: &'a mut [Index],
    axis: usize,
) -> Vec<&'a mut [Index]> {
    let mut buckets: Vec<&mut [Index]> = vec![range];
    for offset in 0..D {
        let coord = (axis + offset) % D;
        let mut halved = Vec::with_capacity(buckets.len() * 2);
        for bucket in buckets {
            let middle = bucket.len() / 2;
            if bucket.len() > 1 {
                bucket.select_nth_unstable_by(middle, |&lhs, &rhs| {
                    points[lhs as usize][coord].total_cmp(&points[rhs as usize][coord])
                });
            }
            let (left, right) = bucket.split_at_mut(middle);
            halved.push(left);
            halved.push(right);
        }
        buckets = halved;
    }
    buckets
}

/// Axis to continue with inside bucket `position`; the pattern is palindromic
/// over the `2^D` buckets.
fn bucket_axis<const D: usize>(axis: usize, position: usize) -> usize {
    let mirrored = position.min((1 << D) - 1 - position);
    (axis + D - 1 - mirrored.count_ones() as usize) % D
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;

    #[test]
    fn mapping_is_a_permutation() {
        let points: Vec<Point2> = (0..37)
            .map(|i| Point2::new(f64::from(i % 7), f64::from(i / 7)))
            .collect();
        let mut mapping = morton_mapping(&points);
        mapping.sort_unstable();
        let identity: Vec<Index> = (0..37).collect();
        assert_eq!(mapping, identity);
    }

    #[test]
    fn neighbours_on_the_curve_are_close() {
        // A 4x4 grid in Morton order never jumps across the whole grid.
        let points: Vec<Point2> = (0..16)
            .map(|i| Point2::new(f64::from(i % 4), f64::from(i / 4)))
            .collect();
        let mapping = morton_mapping(&points);
        for pair in mapping.windows(2) {
            let step = nalgebra::distance(
                &points[pair[0] as usize],
                &points[pair[1] as usize],
            );
            assert!(step < 3.0, "jump of {step} between consecutive entries");
        }
    }
}
