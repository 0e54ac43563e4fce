/*!
# Disc Smith: `libcdio` Transport
*/

use crate::{
	DiscSmithError,
	ScsiTransport,
};
use libcdio_sys::{
	discmode_t_CDIO_DISC_MODE_CD_DA,
	discmode_t_CDIO_DISC_MODE_CD_MIXED,
	driver_id_t_DRIVER_DEVICE, // The equivalent of "use whatever's best".
	driver_return_code_t_DRIVER_OP_SUCCESS,
};
use std::{
	ffi::CString,
	os::unix::ffi::OsStrExt,
	path::Path,
	sync::Once,
};



static LIBCDIO_INIT: Once = Once::new();

/// # Command Timeout (Milliseconds).
const TIMEOUT: u32 = 30_000;

/// # Maximum CDB Length.
const CDB_MAX: usize = 12;

/// # Direction: Read.
const DIR_READ: libcdio_sys::cdio_mmc_direction_t = 0;

/// # Direction: Write.
const DIR_WRITE: libcdio_sys::cdio_mmc_direction_t = 1;

/// # Direction: None.
const DIR_NONE: libcdio_sys::cdio_mmc_direction_t = 2;



#[derive(Debug)]
#[allow(dead_code)] // We just want to make sure dev lives as long as the ptr.
/// # CDIO Instance.
///
/// A connection to an optical drive, exposed as a [`ScsiTransport`] for
/// [`ScsiDrive`](crate::ScsiDrive).
pub struct LibcdioInstance {
	dev: Option<CString>,
	ptr: *mut libcdio_sys::CdIo_t,
}

impl Drop for LibcdioInstance {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		// Release the C memory!
		if ! self.ptr.is_null() {
			unsafe { libcdio_sys::cdio_destroy(self.ptr); }
		}
	}
}

impl LibcdioInstance {
	#[allow(unsafe_code)]
	/// # New!
	///
	/// Initialize a new instance, optionally connecting to a specific device.
	///
	/// ## Errors
	///
	/// This will return an error if initialization fails, the provided
	/// device path is obviously wrong, or there's no audio disc in the drive.
	pub fn new<P>(dev: Option<P>) -> Result<Self, DiscSmithError>
	where P: AsRef<Path> {
		// Make sure the library has been initialized.
		init();

		// Take a look at the desired device.
		let dev = {
			if let Some(dev) = dev {
				let dev = dev.as_ref();
				let original: String = dev.to_string_lossy().into_owned();
				if ! dev.exists() {
					return Err(DiscSmithError::Device(original));
				}
				let dev = CString::new(dev.as_os_str().as_bytes())
					.map_err(|_| DiscSmithError::Device(original))?;
				Some(dev)
			}
			else { None }
		};

		// Connect to it.
		let ptr = unsafe {
			libcdio_sys::cdio_open(
				dev.as_ref().map_or_else(std::ptr::null, |v| v.as_ptr()),
				driver_id_t_DRIVER_DEVICE,
			)
		};

		// NULL is bad.
		if ptr.is_null() {
			Err(DiscSmithError::DeviceOpen(dev.map(|v| v.to_string_lossy().into_owned())))
		}
		else {
			let out = Self { dev, ptr };
			out.check_disc_mode()?;
			Ok(out)
		}
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // These aren't our globals.
	/// # Check Disc Mode.
	///
	/// This makes sure a disc with audio on it is actually in the drive.
	///
	/// ## Errors
	///
	/// Returns an error if the disc is missing or unsupported.
	fn check_disc_mode(&self) -> Result<(), DiscSmithError> {
		let discmode = unsafe { libcdio_sys::cdio_get_discmode(self.ptr) };
		if matches!(
			discmode,
			discmode_t_CDIO_DISC_MODE_CD_DA | discmode_t_CDIO_DISC_MODE_CD_MIXED
		) {
			Ok(())
		}
		else { Err(DiscSmithError::DiscMode) }
	}
}

impl ScsiTransport for LibcdioInstance {
	#[allow(unsafe_code)]
	/// # Send Command.
	///
	/// `libcdio` doesn't print anything of its own, so `silent` changes
	/// nothing here.
	fn send_cmd(
		&mut self,
		cdb: &[u8],
		data_out: Option<&[u8]>,
		data_in: Option<&mut [u8]>,
		_silent: bool,
	) -> bool {
		if cdb.is_empty() || CDB_MAX < cdb.len() { return false; }
		let mut raw = libcdio_sys::mmc_cdb_t { field: [0; CDB_MAX] };
		raw.field[..cdb.len()].copy_from_slice(cdb);

		// The library wants a mutable pointer either way.
		let mut out_buf: Vec<u8>;
		let (dir, buf): (_, &mut [u8]) = match (data_in, data_out) {
			(Some(dst), _) => (DIR_READ, dst),
			(None, Some(src)) => {
				out_buf = src.to_vec();
				(DIR_WRITE, out_buf.as_mut_slice())
			},
			(None, None) => (DIR_NONE, &mut []),
		};
		let Ok(len) = u32::try_from(buf.len()) else { return false; };

		let res = unsafe {
			libcdio_sys::mmc_run_cmd(
				self.ptr,
				TIMEOUT,
				&raw,
				dir,
				len,
				buf.as_mut_ptr().cast(),
			)
		};

		res == driver_return_code_t_DRIVER_OP_SUCCESS
	}

	#[allow(unsafe_code)]
	/// # Sense Data.
	fn sense(&mut self) -> Vec<u8> {
		let mut raw: *mut libcdio_sys::cdio_mmc_request_sense_t = std::ptr::null_mut();
		let len = unsafe { libcdio_sys::mmc_last_cmd_sense(self.ptr, &mut raw) };
		if raw.is_null() { return Vec::new(); }

		let out = usize::try_from(len).ok()
			.filter(|&len| len != 0)
			.map_or_else(Vec::new, |len| unsafe {
				std::slice::from_raw_parts(raw.cast::<u8>(), len).to_vec()
			});
		unsafe { libcdio_sys::cdio_free(raw.cast()); }
		out
	}
}



#[allow(unsafe_code)]
/// # Initialize `libcdio`.
fn init() {
	LIBCDIO_INIT.call_once(|| unsafe { libcdio_sys::cdio_init(); });
}
