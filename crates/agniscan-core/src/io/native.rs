//! Native GeoTIFF reading and writing
//!
//! Single-band TIFF I/O through the `tiff` crate, carrying the GeoTIFF
//! tags the rest of the toolchain expects: pixel scale and tiepoint for
//! the transform, a GeoKeyDirectory naming the EPSG code, and GDAL's
//! no-data tag. Reflectance and index grids travel as 32-bit float
//! samples, classification grids as bytes so class codes survive exactly.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKeyDirectory key ids
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Read a single-band GeoTIFF into a raster.
///
/// Samples are cast into `T`; any that do not fit become `T`'s default
/// no-data. Georeferencing, CRS and no-data sentinel are taken from the
/// optional tags; a plain TIFF is still readable and keeps the default
/// transform, which descriptor checks catch downstream if it matters.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(file)?;

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::F32(buf) => cast_samples(&buf),
        DecodingResult::F64(buf) => cast_samples(&buf),
        DecodingResult::U8(buf) => cast_samples(&buf),
        DecodingResult::U16(buf) => cast_samples(&buf),
        DecodingResult::U32(buf) => cast_samples(&buf),
        DecodingResult::I16(buf) => cast_samples(&buf),
        DecodingResult::I32(buf) => cast_samples(&buf),
        _ => return Err(Error::UnsupportedSample),
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = read_transform(&mut decoder) {
        raster.set_transform(transform);
    }
    if let Some(crs) = read_crs(&mut decoder) {
        raster.set_crs(Some(crs));
    }
    if let Some(sentinel) = read_nodata(&mut decoder) {
        raster.set_nodata(num_traits::cast(sentinel));
    }

    Ok(raster)
}

fn cast_samples<S, T>(buf: &[S]) -> Vec<T>
where
    S: Copy + num_traits::NumCast,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn read_transform<R>(decoder: &mut Decoder<R>) -> Option<GeoTransform>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE))
        .ok()?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT))
        .ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // Tiepoint pins raster point (I, J) to model point (X, Y). Products
    // written here always tie (0, 0) to the upper-left corner, but the
    // general form costs nothing.
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_crs<R>(decoder: &mut Decoder<R>) -> Option<CRS>
where
    R: std::io::Read + std::io::Seek,
{
    let keys = decoder
        .get_tag_u16_vec(Tag::Unknown(GEO_KEY_DIRECTORY))
        .ok()?;

    // Header is [version, revision, minor, key count], then one
    // [id, location, count, value] entry per key. An entry with
    // location 0 stores its value inline.
    let num_keys = *keys.get(3)? as usize;
    for entry in keys.get(4..)?.chunks_exact(4).take(num_keys) {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 {
            continue;
        }
        if id == PROJECTED_CS_TYPE || id == GEOGRAPHIC_TYPE {
            return Some(CRS::from_epsg(value as u32));
        }
    }
    None
}

fn read_nodata<R>(decoder: &mut Decoder<R>) -> Option<f64>
where
    R: std::io::Read + std::io::Seek,
{
    let text = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA))
        .ok()?;
    text.trim_end_matches('\0').trim().parse().ok()
}

/// Write a raster as a 32-bit float GeoTIFF.
///
/// Suitable for reflectance bands and index grids. No-data travels as NaN
/// in the samples and as GDAL's no-data tag in the metadata.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)?;

    let (rows, cols) = raster.shape();
    let samples: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;
    write_geo_tags(&mut image, raster)?;
    image.write_data(&samples)?;

    Ok(())
}

/// Write a byte raster as an 8-bit GeoTIFF.
///
/// Class codes are written exactly, including the 255 no-data code.
pub fn write_geotiff_u8<P>(raster: &Raster<u8>, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)?;

    let (rows, cols) = raster.shape();
    let samples: Vec<u8> = raster.data().iter().copied().collect();

    let mut image = encoder.new_image::<Gray8>(cols as u32, rows as u32)?;
    write_geo_tags(&mut image, raster)?;
    image.write_data(&samples)?;

    Ok(())
}

fn write_geo_tags<T, W, C>(
    image: &mut tiff::encoder::ImageEncoder<'_, W, C, tiff::encoder::TiffKindStandard>,
    raster: &Raster<T>,
) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
    C: tiff::encoder::colortype::ColorType,
{
    let gt = raster.transform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale.as_slice())?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())?;

    let keys = geo_key_directory(raster.crs());
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())?;

    if let Some(sentinel) = raster.nodata().and_then(|v| v.to_f64()) {
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA), sentinel.to_string().as_str())?;
    }

    Ok(())
}

fn geo_key_directory(crs: Option<CRS>) -> Vec<u16> {
    let mut keys: Vec<u16> = vec![
        1, 1, 0, 0, // version 1.1, key count patched below
        GT_MODEL_TYPE, 0, 1, 1, // ModelTypeProjected
        GT_RASTER_TYPE, 0, 1, 1, // RasterPixelIsArea
    ];
    if let Some(code) = crs.and_then(|c| u16::try_from(c.epsg()).ok()) {
        keys.extend_from_slice(&[PROJECTED_CS_TYPE, 0, 1, code]);
    }
    keys[3] = (keys.len() / 4 - 1) as u16;
    keys
}
