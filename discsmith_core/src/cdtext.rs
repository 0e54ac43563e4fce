/*!
# Disc Smith: CD-TEXT
*/

use std::{
	collections::BTreeMap,
	fmt,
};



/// # Helper: CD-TEXT Fields.
macro_rules! fields {
	( $( $k:ident $v:literal $vstr:literal $bin:literal ),+ $(,)? ) => (
		#[repr(u8)]
		#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
		/// # CD-TEXT Field.
		///
		/// The discriminants are the pack type codes used on disc.
		pub enum CdTextKind {
			$(
				#[doc = concat!("# ", stringify!($k), ".")]
				$k = $v,
			)+
		}

		impl CdTextKind {
			/// # All Fields.
			pub const ALL: &'static [Self] = &[ $( Self::$k, )+ ];

			#[must_use]
			/// # As Str.
			///
			/// Return the field as it is written in TOC files.
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$k => $vstr, )+
				}
			}

			#[must_use]
			/// # Binary?
			///
			/// Most fields hold text, but a few hold raw bytes.
			pub const fn is_binary(self) -> bool {
				match self {
					$( Self::$k => $bin, )+
				}
			}

			#[must_use]
			/// # From Keyword.
			pub fn from_keyword(src: &str) -> Option<Self> {
				match src {
					$( $vstr => Some(Self::$k), )+
					_ => None,
				}
			}

			#[must_use]
			/// # From Pack Type.
			pub const fn from_pack(src: u8) -> Option<Self> {
				match src {
					$( $v => Some(Self::$k), )+
					_ => None,
				}
			}
		}
	);
}

fields! {
	Title      0x80 "TITLE"      false,
	Performer  0x81 "PERFORMER"  false,
	Songwriter 0x82 "SONGWRITER" false,
	Composer   0x83 "COMPOSER"   false,
	Arranger   0x84 "ARRANGER"   false,
	Message    0x85 "MESSAGE"    false,
	DiscId     0x86 "DISC_ID"    false,
	Genre      0x87 "GENRE"      true,
	TocInfo1   0x88 "TOC_INFO1"  true,
	TocInfo2   0x89 "TOC_INFO2"  true,
	UpcEan     0x8e "UPC_EAN"    false,
	SizeInfo   0x8f "SIZE_INFO"  true,
}

impl AsRef<str> for CdTextKind {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for CdTextKind {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # CD-TEXT Value.
pub enum CdTextValue {
	/// # Text.
	Text(String),

	/// # Raw Bytes.
	Binary(Vec<u8>),
}

impl CdTextValue {
	#[must_use]
	/// # As Text.
	pub fn as_text(&self) -> Option<&str> {
		if let Self::Text(s) = self { Some(s) }
		else { None }
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Text(s) => s.is_empty(),
			Self::Binary(s) => s.is_empty(),
		}
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # CD-TEXT.
///
/// A disc or track's CD-TEXT, keyed by language block (`0..=7`) and field.
/// Each block can additionally be mapped to a language code.
pub struct CdText {
	items: BTreeMap<(u8, CdTextKind), CdTextValue>,
	languages: BTreeMap<u8, u8>,
}

impl CdText {
	/// # Maximum Block.
	pub const MAX_BLOCK: u8 = 7;

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.items.is_empty() && self.languages.is_empty() }

	#[must_use]
	/// # Get Value.
	pub fn get(&self, block: u8, kind: CdTextKind) -> Option<&CdTextValue> {
		self.items.get(&(block, kind))
	}

	/// # Set Value.
	///
	/// Empty values remove the field. Returns `false` if the block number is
	/// out of range or the value type does not suit the field.
	pub fn set(&mut self, block: u8, kind: CdTextKind, value: CdTextValue) -> bool {
		if Self::MAX_BLOCK < block { return false; }
		if kind.is_binary() != matches!(value, CdTextValue::Binary(_)) { return false; }

		if value.is_empty() { self.items.remove(&(block, kind)); }
		else { self.items.insert((block, kind), value); }
		true
	}

	/// # Remove Value.
	pub fn remove(&mut self, block: u8, kind: CdTextKind) -> Option<CdTextValue> {
		self.items.remove(&(block, kind))
	}

	/// # Items.
	///
	/// Iterate over `(block, field, value)` in block then pack-type order.
	pub fn iter(&self) -> impl Iterator<Item=(u8, CdTextKind, &CdTextValue)> {
		self.items.iter().map(|(&(b, k), v)| (b, k, v))
	}

	/// # Used Blocks.
	///
	/// Return the sorted, deduplicated block numbers with at least one value.
	pub fn blocks(&self) -> Vec<u8> {
		let mut out: Vec<u8> = self.items.keys().map(|(b, _)| *b).collect();
		out.dedup();
		out
	}

	#[must_use]
	/// # Language.
	pub fn language(&self, block: u8) -> Option<u8> { self.languages.get(&block).copied() }

	/// # Set Language.
	///
	/// Returns `false` if the block number is out of range.
	pub fn set_language(&mut self, block: u8, code: u8) -> bool {
		if Self::MAX_BLOCK < block { false }
		else {
			self.languages.insert(block, code);
			true
		}
	}

	/// # Languages.
	pub fn languages(&self) -> impl Iterator<Item=(u8, u8)> + '_ {
		self.languages.iter().map(|(&b, &c)| (b, c))
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_kinds() {
		for &kind in CdTextKind::ALL {
			assert_eq!(CdTextKind::from_keyword(kind.as_str()), Some(kind));
			assert_eq!(CdTextKind::from_pack(kind as u8), Some(kind));
		}
		assert_eq!(CdTextKind::from_pack(0x8a), None);
		assert!(CdTextKind::Genre.is_binary());
		assert!(! CdTextKind::Title.is_binary());
	}

	#[test]
	fn t_cdtext() {
		let mut text = CdText::default();
		assert!(text.is_empty());

		assert!(text.set(0, CdTextKind::Title, CdTextValue::Text("Hello".to_owned())));
		assert!(text.set(1, CdTextKind::Title, CdTextValue::Text("Hallo".to_owned())));
		assert!(text.set(0, CdTextKind::Genre, CdTextValue::Binary(vec![0, 1])));

		// Wrong types and blocks.
		assert!(! text.set(8, CdTextKind::Title, CdTextValue::Text("X".to_owned())));
		assert!(! text.set(0, CdTextKind::Genre, CdTextValue::Text("X".to_owned())));

		assert_eq!(text.blocks(), vec![0, 1]);
		assert_eq!(
			text.get(0, CdTextKind::Title).and_then(CdTextValue::as_text),
			Some("Hello"),
		);

		// Ordering is by block, then pack type.
		let kinds: Vec<(u8, CdTextKind)> = text.iter().map(|(b, k, _)| (b, k)).collect();
		assert_eq!(kinds, vec![
			(0, CdTextKind::Title),
			(0, CdTextKind::Genre),
			(1, CdTextKind::Title),
		]);

		// Empty values remove.
		assert!(text.set(1, CdTextKind::Title, CdTextValue::Text(String::new())));
		assert_eq!(text.blocks(), vec![0]);

		assert!(text.set_language(0, 9));
		assert_eq!(text.language(0), Some(9));
		assert_eq!(text.language(1), None);
	}
}
