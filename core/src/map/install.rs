// Publishing a virtual disk to the platform
//
// The partition goes first so that its file system is already bound when
// the disk appears. Each device is connected right after it is published.
// Registration is final: nothing here ever unpublishes a device.

use super::platform::{DeviceRole, Platform};
use crate::error::{InstallError, InstallStage, PlatformError};
use crate::vdisk::{VirtualBlockIo, VirtualDisk};

fn failed(
    stage: InstallStage,
    partition_registered: bool,
) -> impl FnOnce(PlatformError) -> InstallError {
    move |cause| InstallError {
        stage,
        cause: Some(cause),
        partition_registered,
    }
}

/// Publish the partition (if any) then the disk.
///
/// On error the devices already published stay registered; the error's
/// stage tells how far installation got. Only shared borrows of `disk` are
/// live across platform calls, since connecting a device reads from it.
pub fn install<P: Platform + ?Sized>(
    disk: &VirtualDisk<'_>,
    platform: &mut P,
) -> Result<(), InstallError> {
    if disk.registration().is_registered() {
        return Err(InstallError {
            stage: InstallStage::AlreadyRegistered,
            cause: None,
            partition_registered: false,
        });
    }

    let mut partition_registered = false;
    if let Some(part) = disk.partition() {
        log::info!("Installing block_io protocol for virtual partition");
        let handle = platform
            .install_block_device(DeviceRole::Partition, part.device_path(), part.media())
            .map_err(failed(InstallStage::Partition, false))?;
        part.register(handle);
        partition_registered = true;
        platform
            .connect_controller(handle)
            .map_err(failed(InstallStage::PartitionConnect, true))?;
    }

    log::info!("Installing block_io protocol for virtual disk");
    let handle = platform
        .install_block_device(DeviceRole::Disk, disk.device_path(), disk.media())
        .map_err(failed(InstallStage::Disk, partition_registered))?;
    disk.register(handle);
    platform
        .connect_controller(handle)
        .map_err(failed(InstallStage::DiskConnect, partition_registered))?;

    Ok(())
}
