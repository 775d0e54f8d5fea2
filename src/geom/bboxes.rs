#[cfg(test)]
use crate::geom::EPS;
use crate::geom::point::Point;

/// Checks whether a point is inside (or on the boundary of) the box `pmin..pmax`.
#[cfg(test)]
pub(crate) fn is_point_inside_bbox(ptest: Point, pmin: Point, pmax: Point) -> bool {
    ptest.x >= pmin.x - EPS
        && ptest.x <= pmax.x + EPS
        && ptest.y >= pmin.y - EPS
        && ptest.y <= pmax.y + EPS
        && ptest.z >= pmin.z - EPS
        && ptest.z <= pmax.z + EPS
}

/// Min and max corners of the box holding all points.
///
/// Returns `None` for an empty iterator.
pub fn bounding_box<I>(pts: I) -> Option<(Point, Point)>
where
    I: IntoIterator<Item = Point>,
{
    let mut iter = pts.into_iter();
    let first = iter.next()?;
    let (mut pmin, mut pmax) = (first, first);
    for p in iter {
        pmin.x = pmin.x.min(p.x);
        pmin.y = pmin.y.min(p.y);
        pmin.z = pmin.z.min(p.z);
        pmax.x = pmax.x.max(p.x);
        pmax.y = pmax.y.max(p.y);
        pmax.z = pmax.z.max(p.z);
    }
    Some((pmin, pmax))
}

/// Length of the box diagonal (0 for an empty set).
pub fn bbox_diagonal<I>(pts: I) -> f64
where
    I: IntoIterator<Item = Point>,
{
    bounding_box(pts)
        .map(|(pmin, pmax)| pmin.distance(&pmax))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let pts = vec![
            Point::new(0., 1., 2.),
            Point::new(-1., 5., 0.),
            Point::new(3., 0., 1.),
        ];
        let (pmin, pmax) = bounding_box(pts.iter().copied()).unwrap();
        assert!(pmin.is_close(&Point::new(-1., 0., 0.)));
        assert!(pmax.is_close(&Point::new(3., 5., 2.)));
        assert!(is_point_inside_bbox(Point::new(0., 0., 0.), pmin, pmax));
        assert!(is_point_inside_bbox(pmax, pmin, pmax));
        assert!(!is_point_inside_bbox(Point::new(4., 0., 0.), pmin, pmax));
    }

    #[test]
    fn test_empty() {
        assert!(bounding_box(Vec::<Point>::new()).is_none());
        assert_eq!(bbox_diagonal(Vec::<Point>::new()), 0.0);
    }

    #[test]
    fn test_diagonal() {
        let pts = [Point::new(0., 0., 0.), Point::new(1., 2., 2.)];
        assert_eq!(bbox_diagonal(pts), 3.0);
    }
}
