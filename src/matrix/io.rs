use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::Matrix;
use crate::errors::{RudderError, RudderResult};

// Binary layout: i32 rows, i32 columns, f64 data[rows * columns], all in
// host byte order.

impl Matrix {
    /// Writes the matrix to an open binary stream.
    pub fn write_to(&self, writer: &mut impl Write) -> RudderResult<()> {
        writer.write_all(&(self.rows() as i32).to_ne_bytes())?;
        writer.write_all(&(self.columns() as i32).to_ne_bytes())?;
        for &value in self.as_slice() {
            writer.write_all(&value.to_ne_bytes())?;
        }
        Ok(())
    }

    /// Reads a matrix from an open binary stream.
    pub fn read_from(reader: &mut impl Read) -> RudderResult<Matrix> {
        let mut header = [0u8; 4];
        reader.read_exact(&mut header)?;
        let rows = i32::from_ne_bytes(header);
        reader.read_exact(&mut header)?;
        let columns = i32::from_ne_bytes(header);

        if rows <= 0 || columns <= 0 {
            return Err(RudderError::MalformedHeader { rows, columns });
        }

        let mut matrix = Matrix::new(rows as usize, columns as usize);
        let mut cell = [0u8; 8];
        for value in matrix.as_slice_mut() {
            reader.read_exact(&mut cell)?;
            *value = f64::from_ne_bytes(cell);
        }
        Ok(matrix)
    }

    /// Stores the matrix to a binary file.
    pub fn save(&self, path: impl AsRef<Path>) -> RudderResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a matrix from a binary file.
    pub fn load(path: impl AsRef<Path>) -> RudderResult<Matrix> {
        let mut reader = BufReader::new(File::open(path)?);
        Matrix::read_from(&mut reader)
    }
}
