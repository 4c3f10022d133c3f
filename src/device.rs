//! USB device opening and session lifecycle.
//!
//! [`DongleSession::open`] opens the dongle by vendor/product ID, turns on
//! automatic kernel driver detaching, reads the active configuration and claims
//! every interface in it. The [`Drop`] impl gives everything back in reverse
//! order, so a session that fails halfway through setup still cleans up what it
//! already acquired.

use std::time::Duration;

use rusb::{ConfigDescriptor, Context, DeviceHandle, UsbContext};
use tracing::{debug, warn};

use crate::error::DongleError;

/// The handle operations a session needs once the device is open.
///
/// Implemented by rusb's [`DeviceHandle`]; tests substitute a recording
/// handle to check the claim/release lifecycle without hardware.
pub trait UsbHandle {
    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()>;
    fn set_alternate_setting(&mut self, interface: u8, setting: u8) -> rusb::Result<()>;
    fn release_interface(&mut self, interface: u8) -> rusb::Result<()>;
    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl UsbHandle for DeviceHandle<Context> {
    fn claim_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::claim_interface(self, interface)
    }

    fn set_alternate_setting(&mut self, interface: u8, setting: u8) -> rusb::Result<()> {
        DeviceHandle::set_alternate_setting(self, interface, setting)
    }

    fn release_interface(&mut self, interface: u8) -> rusb::Result<()> {
        DeviceHandle::release_interface(self, interface)
    }

    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::write_control(self, request_type, request, value, index, buf, timeout)
    }
}

/// The configuration that was active when the session was opened.
struct ActiveConfig {
    number: u8,
    descriptor: ConfigDescriptor,
}

/// Handle to an opened receiver dongle with all of its interfaces claimed.
pub struct DongleSession<H: UsbHandle = DeviceHandle<Context>> {
    pub(crate) handle: H,
    config: Option<ActiveConfig>,
    interfaces: Vec<u8>,
    vendor_id: u16,
    product_id: u16,
}

/// Parse a product ID the way it is typed on the command line: bare hex, no
/// `0x` prefix, no sign, at most 16 bits.
pub fn parse_product_id(product_id: &str) -> Result<u16, DongleError> {
    if product_id.starts_with('+') {
        return Err(DongleError::InvalidProductId(product_id.to_string()));
    }
    u16::from_str_radix(product_id, 16)
        .map_err(|_| DongleError::InvalidProductId(product_id.to_string()))
}

impl DongleSession {
    /// Open the device, enable auto-detach, load the active configuration and
    /// claim all of its interfaces.
    pub fn open(vendor_id: u16, product_id: &str) -> Result<Self, DongleError> {
        let pid = parse_product_id(product_id)?;
        let context = Context::new()?;

        let handle = context
            .open_device_with_vid_pid(vendor_id, pid)
            .ok_or(DongleError::DeviceNotFound { vid: vendor_id, pid })?;
        debug!("Opened device {:04x}:{:04x}", vendor_id, pid);

        let mut session = Self::from_handle(handle, vendor_id, pid);
        session.enable_auto_detach()?;
        session.load_active_config()?;

        let interfaces: Vec<(u8, usize)> = match &session.config {
            Some(config) => config
                .descriptor
                .interfaces()
                .map(|i| (i.number(), i.descriptors().count()))
                .collect(),
            None => Vec::new(),
        };
        session.claim_interfaces(&interfaces)?;

        Ok(session)
    }

    /// Let libusb detach the kernel driver on claim and reattach it on release.
    fn enable_auto_detach(&mut self) -> Result<(), DongleError> {
        self.handle
            .set_auto_detach_kernel_driver(true)
            .map_err(DongleError::AutoDetach)?;
        debug!("Auto detach of kernel drivers enabled");
        Ok(())
    }

    fn load_active_config(&mut self) -> Result<(), DongleError> {
        let number = self.handle.active_configuration()?;
        let descriptor = self.handle.device().active_config_descriptor()?;
        debug!(
            "Active configuration {} with {} interface(s)",
            number,
            descriptor.num_interfaces()
        );
        self.config = Some(ActiveConfig { number, descriptor });
        Ok(())
    }
}

impl<H: UsbHandle> DongleSession<H> {
    /// Wrap an already opened handle. Nothing is claimed yet.
    pub(crate) fn from_handle(handle: H, vendor_id: u16, product_id: u16) -> Self {
        Self {
            handle,
            config: None,
            interfaces: Vec::new(),
            vendor_id,
            product_id,
        }
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// The active configuration number, once it has been loaded.
    pub fn configuration(&self) -> Option<u8> {
        self.config.as_ref().map(|c| c.number)
    }

    /// Claimed interface numbers, in the order they were claimed.
    pub fn interfaces(&self) -> &[u8] {
        &self.interfaces
    }

    /// Claim each `(interface, alternate setting count)` at alternate setting 0.
    pub(crate) fn claim_interfaces(&mut self, interfaces: &[(u8, usize)]) -> Result<(), DongleError> {
        for &(interface, alt_settings) in interfaces {
            self.handle
                .claim_interface(interface)
                .map_err(|source| DongleError::ClaimInterface { interface, source })?;
            // Claimed from here on, so Drop must release it even if the
            // alternate setting is rejected.
            self.interfaces.push(interface);

            // Devices may stall SET_INTERFACE on an interface that only has
            // its default setting, and alt 0 is already selected after claim.
            if alt_settings > 1 {
                self.handle
                    .set_alternate_setting(interface, 0)
                    .map_err(|source| DongleError::ClaimInterface { interface, source })?;
            }
            debug!("Claimed interface {}", interface);
        }

        Ok(())
    }
}

impl<H: UsbHandle> Drop for DongleSession<H> {
    fn drop(&mut self) {
        while let Some(interface) = self.interfaces.pop() {
            match self.handle.release_interface(interface) {
                Ok(()) => debug!("Released interface {}", interface),
                Err(e) => warn!("Failed to release interface {}: {}", interface, e),
            }
        }

        if let Some(config) = self.config.take() {
            debug!("Closed configuration {}", config.number);
        }

        debug!(
            "Closing device {:04x}:{:04x}",
            self.vendor_id, self.product_id
        );
    }
}
