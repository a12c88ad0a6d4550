use std::io::{prelude::*, BufReader, Read};

use crate::errors::{Result, SudareError};

/// Connection costs read from `matrix.def`.
pub struct Matrix {
    pub left_size: usize,
    pub right_size: usize,
    costs: Vec<i16>,
}

impl Matrix {
    /// Reads `matrix.def`.
    ///
    /// The first line that is neither blank nor a comment is the header `<left> <right>`.
    /// Every following line is `<left_id> <right_id> <cost>`; unlisted pairs cost 0.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut sizes = None;
        let mut costs = vec![];
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            let Some((left_size, right_size)) = sizes else {
                let (left_size, right_size) = Self::parse_header(&cols, i + 1)?;
                sizes = Some((left_size, right_size));
                costs = vec![0; left_size * right_size];
                continue;
            };
            if cols.len() != 3 {
                let msg = format!(
                    "a row other than the header must consist of three integers at line {}",
                    i + 1
                );
                return Err(SudareError::invalid_format("matrix.def", msg));
            }
            let left_id: usize = cols[0].parse()?;
            let right_id: usize = cols[1].parse()?;
            let cost: i16 = cols[2].parse()?;
            if left_id >= left_size || right_id >= right_size {
                let msg = format!(
                    "({left_id}, {right_id}) is out of {left_size}x{right_size} at line {}",
                    i + 1
                );
                return Err(SudareError::invalid_format("matrix.def", msg));
            }
            costs[left_id + left_size * right_id] = cost;
        }
        let Some((left_size, right_size)) = sizes else {
            return Err(SudareError::invalid_format(
                "matrix.def",
                "the header is missing",
            ));
        };
        Ok(Self {
            left_size,
            right_size,
            costs,
        })
    }

    fn parse_header(cols: &[&str], lineno: usize) -> Result<(usize, usize)> {
        if cols.len() != 2 {
            let msg = format!(
                "the header must consist of two integers at line {lineno}"
            );
            return Err(SudareError::invalid_format("matrix.def", msg));
        }
        let left_size: i16 = cols[0].parse()?;
        let right_size: i16 = cols[1].parse()?;
        Ok((usize::try_from(left_size)?, usize::try_from(right_size)?))
    }

    /// Gets the cost of connecting `left_id` to `right_id`.
    #[inline(always)]
    pub fn cost(&self, left_id: i16, right_id: i16) -> i16 {
        let (Ok(left_id), Ok(right_id)) = (usize::try_from(left_id), usize::try_from(right_id))
        else {
            return 0;
        };
        self.costs
            .get(left_id + self.left_size * right_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader() {
        let data = "# comment\n2 3\n\n0 0 -1\n1 2 7\n0 1 100";
        let matrix = Matrix::from_reader(data.as_bytes()).unwrap();
        assert_eq!((matrix.left_size, matrix.right_size), (2, 3));
        assert_eq!(matrix.cost(0, 0), -1);
        assert_eq!(matrix.cost(1, 2), 7);
        assert_eq!(matrix.cost(0, 1), 100);
        assert_eq!(matrix.cost(1, 0), 0);
        assert_eq!(matrix.costs, vec![-1, 0, 100, 0, 0, 7]);
    }

    #[test]
    fn test_invalid() {
        assert!(Matrix::from_reader("".as_bytes()).is_err());
        assert!(Matrix::from_reader("# only a comment".as_bytes()).is_err());
        assert!(Matrix::from_reader("1".as_bytes()).is_err());
        assert!(Matrix::from_reader("1 1\n0 0".as_bytes()).is_err());
        assert!(Matrix::from_reader("1 1\n0 1 5".as_bytes()).is_err());
        assert!(Matrix::from_reader("1 1\n0 0 x".as_bytes()).is_err());
        assert!(Matrix::from_reader("1 1\n0 0 40000".as_bytes()).is_err());
    }
}
