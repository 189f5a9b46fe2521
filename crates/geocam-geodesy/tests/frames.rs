//! Cross-module checks of the public geodesy API.

use approx::assert_abs_diff_eq;
use geocam_geodesy::utm::{to_latlon, to_utm, to_utm_in_zone};
use geocam_geodesy::{CoordinateContext, GlobalFrame, Hemisphere, UtmZone};

#[test]
fn test_utm_context_agrees_with_projection() {
    let ctx = CoordinateContext::utm(-33.87, 151.21, 25.0);
    let origin = ctx.utm_origin().unwrap();
    assert_eq!(origin.zone.number(), 56);
    assert_eq!(origin.hemisphere, Hemisphere::South);

    // A point 1 km east and 2 km north of the origin.
    let (lon, lat, elev) = ctx.local_to_global(1000.0, 2000.0, 5.0, GlobalFrame::Wgs84);
    let (e, n) = to_utm_in_zone(lat, lon, origin.zone, origin.hemisphere);
    assert_abs_diff_eq!(e - origin.easting, 1000.0, epsilon = 1e-4);
    assert_abs_diff_eq!(n - origin.northing, 2000.0, epsilon = 1e-4);
    assert_abs_diff_eq!(elev, 30.0, epsilon = 1e-9);
}

#[test]
fn test_neighbouring_zone_projection() {
    // 1 degree past the zone boundary, forced into the western zone.
    let zone = UtmZone::new(17).unwrap();
    let (e, n) = to_utm_in_zone(40.0, -77.0, zone, Hemisphere::North);
    let (lat, lon, _) = to_latlon(zone, Hemisphere::North, e, n, 0.0);
    assert_abs_diff_eq!(lat, 40.0, epsilon = 1e-8);
    assert_abs_diff_eq!(lon, -77.0, epsilon = 1e-8);

    let native = to_utm(40.0, -77.0);
    assert_eq!(native.zone.number(), 18);
    assert!((native.easting - e).abs() > 1000.0);
}

#[test]
fn test_wgs84_and_utm_contexts_agree_locally() {
    let wgs84 = CoordinateContext::wgs84(47.6, -122.3, 0.0);
    let utm = CoordinateContext::utm(47.6, -122.3, 0.0);

    let (lon, lat, _) = wgs84.local_to_global(100.0, 100.0, 0.0, GlobalFrame::Wgs84);
    let (x, y, _) = utm.global_to_local(lon, lat, 0.0, GlobalFrame::Wgs84);
    // Grid convergence and scale make the frames differ slightly.
    assert_abs_diff_eq!(x, 100.0, epsilon = 2.0);
    assert_abs_diff_eq!(y, 100.0, epsilon = 2.0);
}

#[test]
fn test_context_record_roundtrip_through_bytes() {
    let ctx = CoordinateContext::from_utm_origin(
        500_123.5,
        4_649_776.25,
        231.0,
        UtmZone::new(31).unwrap(),
        Hemisphere::North,
    );
    let mut buf = bytes::BytesMut::new();
    ctx.write_binary(&mut buf);
    assert_eq!(buf.len(), 45);

    let mut frozen = buf.freeze();
    let decoded = CoordinateContext::read_binary(&mut frozen).unwrap();
    assert_eq!(decoded, ctx);
    assert_eq!(frozen.len(), 0);
}
