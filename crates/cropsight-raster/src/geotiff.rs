//! GeoTIFF band reading with the `tiff` crate
//!
//! Only the chunks (tiles or strips) overlapping a requested window are
//! decoded. Georeferencing comes from ModelPixelScale + ModelTiepoint or
//! ModelTransformation, the CRS from the GeoKeyDirectory, and nodata from
//! the GDAL_NODATA tag.

use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{BandId, BandSource, Crs, GeoTransform, PixelWindow};
use cropsight_core::ports::{BandDataset, BandReader};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;
const USER_DEFINED: u32 = 32767;

/// Opens band sources as GeoTIFFs from disk or over HTTP
#[derive(Debug, Default, Clone)]
pub struct GeoTiffReader;

impl GeoTiffReader {
    pub fn new() -> Self {
        Self
    }

    fn fetch(band: BandId, source: &BandSource) -> Result<Cursor<Vec<u8>>> {
        let unavailable = |reason: String| CropsightError::BandUnavailable {
            band: band.to_string(),
            source_handle: source.to_string(),
            reason,
        };

        tracing::info!("Downloading {} from {}", band, source);
        let response = reqwest::blocking::get(source.as_str())
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(format!("HTTP request failed: {}", e)))?;
        let bytes =
            response.bytes().map_err(|e| unavailable(format!("Failed to read body: {}", e)))?;

        tracing::debug!("Fetched {} bytes for {}", bytes.len(), band);
        Ok(Cursor::new(bytes.to_vec()))
    }
}

impl BandReader for GeoTiffReader {
    fn open(&self, band: BandId, source: &BandSource) -> Result<Box<dyn BandDataset>> {
        if source.is_remote() {
            let cursor = Self::fetch(band, source)?;
            return Ok(Box::new(GeoTiffDataset::new(cursor, band, source)?));
        }

        let file = File::open(source.as_str()).map_err(|e| CropsightError::BandUnavailable {
            band: band.to_string(),
            source_handle: source.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(GeoTiffDataset::new(BufReader::new(file), band, source)?))
    }
}

/// Single-band GeoTIFF opened for windowed reads
pub struct GeoTiffDataset<R: Read + Seek> {
    decoder: Decoder<R>,
    band: BandId,
    handle: String,
    rows: usize,
    cols: usize,
    chunk_cols: usize,
    chunk_rows: usize,
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f64>,
}

impl<R: Read + Seek> GeoTiffDataset<R> {
    pub fn new(reader: R, band: BandId, source: &BandSource) -> Result<Self> {
        let handle = source.to_string();
        let format_error = |reason: String| CropsightError::RasterFormat {
            source_handle: source.to_string(),
            reason,
        };

        let mut decoder = Decoder::new(reader)
            .map_err(|e| format_error(format!("TIFF decode error: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| format_error(format!("Cannot read dimensions: {}", e)))?;

        match decoder.colortype() {
            Ok(ColorType::Gray(_)) => {}
            Ok(other) => {
                return Err(format_error(format!("Expected a single-band raster, found {:?}", other)))
            }
            Err(e) => return Err(format_error(format!("Cannot read color type: {}", e))),
        }

        let transform = read_geotransform(&mut decoder)
            .ok_or_else(|| format_error("No georeferencing tags found".to_string()))?;
        let crs = read_crs(&mut decoder).map_err(format_error)?;
        let nodata = read_nodata(&mut decoder);
        let (chunk_cols, chunk_rows) = decoder.chunk_dimensions();

        tracing::debug!(
            "Opened {} ({}x{}, {}, chunk {}x{}, nodata {:?})",
            handle,
            width,
            height,
            crs,
            chunk_cols,
            chunk_rows,
            nodata
        );

        Ok(Self {
            decoder,
            band,
            handle,
            rows: height as usize,
            cols: width as usize,
            chunk_cols: chunk_cols.max(1) as usize,
            chunk_rows: chunk_rows.max(1) as usize,
            transform,
            crs,
            nodata,
        })
    }

    fn read_failure(&self, reason: String) -> CropsightError {
        CropsightError::BandUnavailable {
            band: self.band.to_string(),
            source_handle: self.handle.clone(),
            reason,
        }
    }
}

impl<R: Read + Seek> BandDataset for GeoTiffDataset<R> {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn read_window(&mut self, window: &PixelWindow) -> Result<Array2<f32>> {
        if window.col_off + window.width > self.cols || window.row_off + window.height > self.rows
        {
            return Err(self.read_failure(format!("Window {:?} exceeds raster bounds", window)));
        }

        let mut out = Array2::from_elem((window.height, window.width), f32::NAN);
        if window.is_empty() {
            return Ok(out);
        }

        let chunks_across = self.cols.div_ceil(self.chunk_cols);
        let first_cx = window.col_off / self.chunk_cols;
        let last_cx = (window.col_off + window.width - 1) / self.chunk_cols;
        let first_cy = window.row_off / self.chunk_rows;
        let last_cy = (window.row_off + window.height - 1) / self.chunk_rows;

        for cy in first_cy..=last_cy {
            for cx in first_cx..=last_cx {
                let chunk_index = (cy * chunks_across + cx) as u32;
                let chunk_col0 = cx * self.chunk_cols;
                let chunk_row0 = cy * self.chunk_rows;
                let data_cols = self.chunk_cols.min(self.cols - chunk_col0);
                let data_rows = self.chunk_rows.min(self.rows - chunk_row0);

                let decoded = self
                    .decoder
                    .read_chunk(chunk_index)
                    .map_err(|e| self.read_failure(format!("Chunk {}: {}", chunk_index, e)))?;
                let values = decoding_result_to_f32(decoded)
                    .ok_or_else(|| self.read_failure("Unsupported sample format".to_string()))?;

                // Edge tiles may come back cropped or padded to the full tile size
                let stride = if values.len() == data_cols * data_rows {
                    data_cols
                } else if values.len() >= self.chunk_cols * data_rows {
                    self.chunk_cols
                } else {
                    return Err(self.read_failure(format!(
                        "Chunk {} has {} samples, expected {}",
                        chunk_index,
                        values.len(),
                        data_cols * data_rows
                    )));
                };

                let row_start = chunk_row0.max(window.row_off);
                let row_end = (chunk_row0 + data_rows).min(window.row_off + window.height);
                let col_start = chunk_col0.max(window.col_off);
                let col_end = (chunk_col0 + data_cols).min(window.col_off + window.width);

                for row in row_start..row_end {
                    for col in col_start..col_end {
                        let value = values[(row - chunk_row0) * stride + (col - chunk_col0)];
                        out[[row - window.row_off, col - window.col_off]] = value;
                    }
                }
            }
        }

        Ok(out)
    }
}

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, or ModelTransformation
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok();

    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // tiepoint: [I, J, K, X, Y, Z]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
        }
    }

    // 4x4 row-major matrix
    let matrix = decoder.get_tag_f64_vec(tag(MODEL_TRANSFORMATION)).ok()?;
    if matrix.len() >= 16 {
        return Some(GeoTransform {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: matrix[5],
            row_rotation: matrix[1],
            col_rotation: matrix[4],
        });
    }

    None
}

/// EPSG code from the GeoKeyDirectory
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> std::result::Result<Crs, String> {
    let keys = decoder
        .get_tag_u32_vec(tag(GEO_KEY_DIRECTORY))
        .map_err(|e| format!("No GeoKeyDirectory: {}", e))?;

    parse_geokey_epsg(&keys)
}

/// Parse `[version, revision, minor, count, (key, location, count, value)...]`
pub(crate) fn parse_geokey_epsg(keys: &[u32]) -> std::result::Result<Crs, String> {
    if keys.len() < 4 {
        return Err("GeoKeyDirectory is truncated".to_string());
    }

    let mut geographic = None;
    for entry in keys[4..].chunks_exact(4).take(keys[3] as usize) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_KEY if value > 0 && value != USER_DEFINED => {
                return Ok(Crs::new(value));
            }
            GEOGRAPHIC_TYPE_KEY if value > 0 && value != USER_DEFINED => {
                geographic = Some(Crs::new(value));
            }
            _ => {}
        }
    }

    geographic.ok_or_else(|| "GeoKeyDirectory has no EPSG coded CRS".to_string())
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    text.trim_end_matches('\0').trim().parse::<f64>().ok()
}

fn decoding_result_to_f32(result: DecodingResult) -> Option<Vec<f32>> {
    let values = match result {
        DecodingResult::U8(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(values)
}
