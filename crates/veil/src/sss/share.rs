//! Shares of a secret.

use crate::proto::{Share as ShareProto, WIRE_VERSION};
use crate::{Error, Result};
use num_bigint::BigUint;
use prost::Message;
use std::fmt::{self, Display};
use std::str::FromStr;
use veil_traits::{Deserialize, Serialize};
use veil_util::FieldModulus;

/// A point `(x, y)` of a sharing polynomial.
///
/// Its textual form is `"<hex-x>-<hex-y>"`, lowercase hexadecimal without prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePoint {
    /// The abscissa, in `1..=n`
    pub x: usize,
    /// The evaluation of the polynomial at `x`
    pub y: BigUint,
}

impl Display for SharePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x}", self.x, self.y)
    }
}

impl FromStr for SharePoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once('-')
            .ok_or_else(|| Error::malformed_share("expected the form <hex-x>-<hex-y>"))?;
        let x = usize::from_str_radix(x, 16)
            .map_err(|_| Error::malformed_share(format!("invalid abscissa {:?}", x)))?;
        let y = BigUint::parse_bytes(y.as_bytes(), 16)
            .ok_or_else(|| Error::malformed_share("invalid ordinate"))?;
        if x == 0 {
            return Err(Error::malformed_share("abscissa must be non-zero"));
        }
        Ok(Self { x, y })
    }
}

/// The share of one party: the points at the same abscissa of the sharing
/// polynomials of every chunk of the secret, together with the field modulus
/// and threshold of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub(crate) modulus: FieldModulus,
    pub(crate) threshold: usize,
    pub(crate) points: Vec<SharePoint>,
}

impl Share {
    /// Create a share, checking that the points share one abscissa and lie
    /// in the field.
    pub fn new(modulus: FieldModulus, threshold: usize, points: Vec<SharePoint>) -> Result<Self> {
        let x = points
            .first()
            .map(|pt| pt.x)
            .ok_or_else(|| Error::malformed_share("a share holds at least one point"))?;
        if threshold < 2 {
            return Err(Error::malformed_share(format!("invalid threshold {}", threshold)));
        }
        if BigUint::from(x) >= *modulus.value() {
            return Err(Error::malformed_share("abscissa lies outside of the field"));
        }
        for pt in &points {
            if pt.x != x {
                return Err(Error::malformed_share("points of a share differ in abscissa"));
            }
            if &pt.y >= modulus.value() {
                return Err(Error::malformed_share("ordinate lies outside of the field"));
            }
        }
        Ok(Self {
            modulus,
            threshold,
            points,
        })
    }

    /// Returns the abscissa of the share.
    pub fn x(&self) -> usize {
        self.points[0].x
    }

    /// Returns the field modulus the secret was split under.
    pub fn modulus(&self) -> &FieldModulus {
        &self.modulus
    }

    /// Returns the number of shares needed for reconstruction.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the points of the share, one per chunk of the secret.
    pub fn points(&self) -> &[SharePoint] {
        &self.points
    }
}

impl From<&Share> for ShareProto {
    fn from(share: &Share) -> Self {
        ShareProto {
            version: WIRE_VERSION,
            modulus_exponent: share.modulus.exponent(),
            threshold: share.threshold as u32,
            points: share.points.iter().map(|pt| pt.to_string()).collect(),
        }
    }
}

impl TryFrom<ShareProto> for Share {
    type Error = Error;

    fn try_from(proto: ShareProto) -> Result<Self> {
        if proto.version != WIRE_VERSION {
            return Err(Error::malformed_share(format!(
                "unsupported version {}",
                proto.version
            )));
        }
        let modulus = FieldModulus::from_exponent(proto.modulus_exponent)
            .map_err(|e| Error::malformed_share(e.to_string()))?;
        let points = proto
            .points
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<SharePoint>>>()?;
        Share::new(modulus, proto.threshold as usize, points)
    }
}

impl Serialize for Share {
    fn to_bytes(&self) -> Vec<u8> {
        ShareProto::from(self).encode_to_vec()
    }
}

impl Deserialize for Share {
    type Error = Error;

    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let proto: ShareProto = Message::decode(bytes)
            .map_err(|_| Error::malformed_share("share is not a valid encoding"))?;
        Share::try_from(proto)
    }
}
